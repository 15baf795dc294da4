use std::sync::Arc;

use teloxide::prelude::*;

use qm_core::domain::ChatId;

use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let chat_id = q.message.as_ref().map(|m| m.chat.id);
    let data = q.data.clone().unwrap_or_default();

    // Callbacks without an attached message carry no chat; just stop the spinner.
    let Some(chat_id) = chat_id else {
        state.commands.acknowledge_button(&q.id).await;
        return Ok(());
    };

    state
        .commands
        .on_button_press(ChatId(chat_id.0), &q.id, &data)
        .await;

    Ok(())
}
