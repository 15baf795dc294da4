//! Telegram update handlers.
//!
//! Each handler only translates a teloxide update into a call on the core
//! `CommandRouter`; the router owns all behavior and never returns an error,
//! so handlers always resolve to `Ok(())`.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;
mod text;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    callback::handle_callback(q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        // Stickers, photos, ... carry nothing the bot understands.
        return Ok(());
    };

    if text.starts_with('/') {
        return commands::handle_command(bot, msg, state).await;
    }

    text::handle_text(bot, msg, state).await
}
