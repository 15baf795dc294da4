use std::{future::Future, pin::Pin, sync::Arc};

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::ErrorHandler, prelude::*,
    types::BotCommand, update_listeners,
};

use qm_core::{
    commands::{Action, CommandRouter},
    config::Config,
    messaging::port::MessagingPort,
    provider::MailProvider,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<CommandRouter>,
}

/// Logs transport-level failures (polling, handler request errors). There is
/// no chat to report these to.
struct TransportErrorHandler {
    context: &'static str,
}

impl<E> ErrorHandler<E> for TransportErrorHandler
where
    E: std::fmt::Display + Send + 'static,
{
    fn handle_error(self: Arc<Self>, error: E) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        tracing::error!("{}: {error}", self.context);
        Box::pin(async {})
    }
}

fn bot_commands() -> Vec<BotCommand> {
    let mut cmds = vec![BotCommand::new("start", "Show the main menu")];
    cmds.extend(
        Action::ALL
            .iter()
            .map(|a| BotCommand::new(a.command().trim_start_matches('/'), a.description())),
    );
    cmds.push(BotCommand::new("select", "Pick a domain from the /domains list"));
    cmds
}

pub async fn run_polling(cfg: Arc<Config>, provider: Arc<dyn MailProvider>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!("Bot started: @{}", me.username()),
        Err(e) => tracing::warn!("Bot started, but getMe failed: {e}"),
    }

    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {e}");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let commands = Arc::new(CommandRouter::new(
        messenger,
        provider,
        cfg.temp_dir.clone(),
        cfg.telegram_safe_limit,
    ));

    let state = Arc::new(AppState { commands });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let listener = update_listeners::polling_default(bot.clone()).await;

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .error_handler(Arc::new(TransportErrorHandler {
            context: "Handler error",
        }))
        .build()
        .dispatch_with_listener(
            listener,
            Arc::new(TransportErrorHandler {
                context: "Polling error",
            }),
        )
        .await;

    Ok(())
}
