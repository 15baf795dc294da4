use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{InlineKeyboard, MessagingCapabilities},
    Result,
};

/// Outbound side of the messaging gateway.
///
/// Telegram is the only implementation; the router only ever talks to this
/// trait so it can be driven by an in-memory fake in tests.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send unformatted text.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Send text in Telegram HTML parse mode.
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    /// Upload a local file as a document, shown to the user as `file_name`.
    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
    ) -> Result<MessageRef>;

    /// Stop the client's loading spinner for a button press.
    async fn answer_callback_query(&self, callback_id: &str) -> Result<()>;
}
