use std::sync::Arc;

use teloxide::prelude::*;

use qm_core::domain::ChatId;

use crate::router::AppState;

pub async fn handle_text(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    state
        .commands
        .on_plain_text(ChatId(msg.chat.id.0), text)
        .await;

    Ok(())
}
