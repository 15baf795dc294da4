//! Core logic for the QuickMail Telegram bot.
//!
//! This crate is framework-agnostic. Telegram and the temporary-mail HTTP API
//! live behind ports (traits) implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod mailbox;
pub mod messaging;
pub mod provider;
pub mod session;
pub mod staging;

pub use errors::{Error, Result};
