//! Command dispatch: one entry point per kind of inbound chat event.
//!
//! Every action catches its own failure, logs it with the action name and
//! answers the chat with one generic sentence. Nothing propagates back to the
//! transport layer.

use std::{future::Future, path::PathBuf, sync::Arc};

use tokio::io::AsyncWriteExt;

use crate::{
    domain::ChatId,
    errors::Error,
    formatting::{
        render_domain_list, render_generated, render_message_detail, render_message_list,
        split_text, WELCOME,
    },
    mailbox::MailboxAddress,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    provider::MailProvider,
    session::{PendingAction, SessionStore},
    staging::StagedFile,
    Result,
};

const INVALID_SELECTION: &str = "Invalid selection. Please try again.";
const NO_PENDING_SELECTION: &str = "No domain list pending. Use /domains first.";
const UNKNOWN_COMMAND: &str = "Unknown command. Send /start to see what I can do.";
const CHECK_FORMAT_ERROR: &str = "Invalid email format. Use: /check username@domain";
const READ_USAGE: &str = "Usage: /read username@domain message_id";
const DOWNLOAD_USAGE: &str = "Usage: /download username@domain message_id filename";

/// The five user-facing operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Generate,
    Domains,
    Check,
    Read,
    Download,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Generate,
        Action::Domains,
        Action::Check,
        Action::Read,
        Action::Download,
    ];

    /// Match a command name without the leading slash (`"check"`).
    pub fn from_command(name: &str) -> Option<Self> {
        match name {
            "generate" => Some(Self::Generate),
            "domains" => Some(Self::Domains),
            "check" => Some(Self::Check),
            "read" => Some(Self::Read),
            "download" => Some(Self::Download),
            _ => None,
        }
    }

    /// Buttons carry the slash command as callback data.
    pub fn from_callback_data(data: &str) -> Option<Self> {
        Self::from_command(data.strip_prefix('/')?)
    }

    pub fn command(self) -> &'static str {
        match self {
            Self::Generate => "/generate",
            Self::Domains => "/domains",
            Self::Check => "/check",
            Self::Read => "/read",
            Self::Download => "/download",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Generate => "Generate",
            Self::Domains => "Domains",
            Self::Check => "Check",
            Self::Read => "Read",
            Self::Download => "Download",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Generate => "Generate a temporary email address",
            Self::Domains => "List domains and choose one",
            Self::Check => "Check a mailbox",
            Self::Read => "Read a message",
            Self::Download => "Download an attachment",
        }
    }

    /// Hint for actions that need arguments a button cannot carry.
    pub fn usage_hint(self) -> Option<&'static str> {
        match self {
            Self::Generate | Self::Domains => None,
            Self::Check => Some(
                "Send your email address to check your mailbox. Example: /check username@domain",
            ),
            Self::Read => Some(
                "Send your email and message ID to read an email. Example: /read username@domain message_id",
            ),
            Self::Download => Some(
                "Send email, message ID, and filename to download an attachment. Example: /download username@domain message_id filename",
            ),
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Generate => "Failed to generate an email. Please try again later.",
            Self::Domains => "Failed to fetch domains. Please try again later.",
            Self::Check => "Failed to fetch messages. Please try again later.",
            Self::Read => "Failed to fetch the email. Please try again later.",
            Self::Download => "Failed to download the attachment. Please try again later.",
        }
    }
}

/// The `/start` keyboard: two actions per row, the last one alone.
pub fn main_menu() -> InlineKeyboard {
    InlineKeyboard::new(
        Action::ALL
            .chunks(2)
            .map(|row| {
                row.iter()
                    .map(|a| InlineButton::new(a.label(), a.command()))
                    .collect()
            })
            .collect(),
    )
}

pub struct CommandRouter {
    messenger: Arc<dyn MessagingPort>,
    provider: Arc<dyn MailProvider>,
    sessions: SessionStore,
    temp_dir: PathBuf,
    text_limit: usize,
}

impl CommandRouter {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        provider: Arc<dyn MailProvider>,
        temp_dir: PathBuf,
        text_limit: usize,
    ) -> Self {
        let text_limit = text_limit.min(messenger.capabilities().max_message_len);
        Self {
            messenger,
            provider,
            sessions: SessionStore::new(),
            temp_dir,
            text_limit,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn on_start(&self, chat_id: ChatId) {
        if let Err(e) = self
            .messenger
            .send_inline_keyboard(chat_id, WELCOME, main_menu())
            .await
        {
            tracing::warn!("Failed to send welcome to chat {}: {e}", chat_id.0);
        }
    }

    /// Button presses run argument-free actions directly and answer the rest
    /// with a usage hint.
    pub async fn on_button_press(&self, chat_id: ChatId, callback_id: &str, data: &str) {
        self.acknowledge_button(callback_id).await;

        let Some(action) = Action::from_callback_data(data) else {
            tracing::debug!("Ignoring unknown callback data {data:?}");
            return;
        };

        self.run_argless(chat_id, action).await
    }

    /// Answer a button press without running anything. Used directly for
    /// presses that arrive without a chat.
    pub async fn acknowledge_button(&self, callback_id: &str) {
        if let Err(e) = self.messenger.answer_callback_query(callback_id).await {
            tracing::warn!("Failed to answer callback query: {e}");
        }
    }

    /// Typed commands. `command` is the lowercased name without slash or
    /// `@botname`; `args` is the rest of the message, trimmed.
    pub async fn on_text_command(&self, chat_id: ChatId, command: &str, args: &str) {
        if command == "select" {
            match self.sessions.take_pending(chat_id).await {
                PendingAction::AwaitingDomainSelection { domains } => {
                    self.resolve_domain_selection(chat_id, &domains, args).await
                }
                PendingAction::Idle => self.reply(chat_id, NO_PENDING_SELECTION).await,
            }
            return;
        }

        // Any other command abandons a pending selection.
        if let PendingAction::AwaitingDomainSelection { .. } =
            self.sessions.take_pending(chat_id).await
        {
            tracing::debug!("Chat {} left domain selection via /{command}", chat_id.0);
        }

        if matches!(command, "start" | "help") {
            return self.on_start(chat_id).await;
        }

        let Some(action) = Action::from_command(command) else {
            return self.reply(chat_id, UNKNOWN_COMMAND).await;
        };

        if args.is_empty() {
            return self.run_argless(chat_id, action).await;
        }

        match action {
            Action::Generate | Action::Domains => self.run_argless(chat_id, action).await,
            Action::Check => self.check_mailbox(chat_id, args).await,
            Action::Read => {
                let mut parts = args.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(email), Some(id)) => self.read_message(chat_id, email, id).await,
                    _ => self.reply(chat_id, READ_USAGE).await,
                }
            }
            Action::Download => match split_args(args, 3).as_slice() {
                [email, id, filename] => {
                    self.download_attachment(chat_id, email, id, filename)
                        .await
                }
                _ => self.reply(chat_id, DOWNLOAD_USAGE).await,
            },
        }
    }

    /// Plain (non-command) text. Only meaningful as the answer to `/domains`.
    pub async fn on_plain_text(&self, chat_id: ChatId, text: &str) {
        match self.sessions.take_pending(chat_id).await {
            PendingAction::AwaitingDomainSelection { domains } => {
                self.resolve_domain_selection(chat_id, &domains, text).await
            }
            PendingAction::Idle => {
                tracing::debug!("Ignoring plain text from chat {}", chat_id.0);
            }
        }
    }

    pub async fn generate_email(&self, chat_id: ChatId) {
        self.guarded(chat_id, Action::Generate, self.try_generate(chat_id))
            .await
    }

    /// Show the domain list and arm this chat's one-shot selection.
    pub async fn list_domains(&self, chat_id: ChatId) {
        self.guarded(chat_id, Action::Domains, self.try_list_domains(chat_id))
            .await
    }

    pub async fn check_mailbox(&self, chat_id: ChatId, email_arg: &str) {
        let Some(mailbox) = MailboxAddress::parse(email_arg) else {
            return self.reply(chat_id, CHECK_FORMAT_ERROR).await;
        };

        self.guarded(chat_id, Action::Check, self.try_check(chat_id, &mailbox))
            .await
    }

    pub async fn read_message(&self, chat_id: ChatId, email_arg: &str, message_id: &str) {
        let (Some(mailbox), Some(id)) = (MailboxAddress::parse(email_arg), parse_id(message_id))
        else {
            return self.reply(chat_id, READ_USAGE).await;
        };

        self.guarded(chat_id, Action::Read, self.try_read(chat_id, &mailbox, id))
            .await
    }

    /// Stage the attachment on disk, upload it, and remove it again whatever
    /// the outcome.
    pub async fn download_attachment(
        &self,
        chat_id: ChatId,
        email_arg: &str,
        message_id: &str,
        filename: &str,
    ) {
        let (Some(mailbox), Some(id)) = (MailboxAddress::parse(email_arg), parse_id(message_id))
        else {
            return self.reply(chat_id, DOWNLOAD_USAGE).await;
        };
        if filename.trim().is_empty() {
            return self.reply(chat_id, DOWNLOAD_USAGE).await;
        }

        self.guarded(
            chat_id,
            Action::Download,
            self.try_download(chat_id, &mailbox, id, filename),
        )
        .await
    }

    async fn try_generate(&self, chat_id: ChatId) -> Result<()> {
        let email = match self.sessions.selected_domain(chat_id).await {
            Some(domain) => MailboxAddress::random_on(&domain).to_string(),
            None => self
                .provider
                .gen_random_mailbox(1)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    Error::Provider("genRandomMailbox returned no address".to_string())
                })?,
        };

        self.messenger
            .send_html(chat_id, &render_generated(&email))
            .await?;
        Ok(())
    }

    async fn try_list_domains(&self, chat_id: ChatId) -> Result<()> {
        let domains = self.provider.get_domain_list().await?;
        self.deliver_text(chat_id, &render_domain_list(&domains))
            .await?;
        self.sessions.await_domain_selection(chat_id, domains).await;
        Ok(())
    }

    async fn try_check(&self, chat_id: ChatId, mailbox: &MailboxAddress) -> Result<()> {
        let messages = self.provider.get_messages(mailbox).await?;
        self.deliver_text(chat_id, &render_message_list(&messages))
            .await
    }

    async fn try_read(&self, chat_id: ChatId, mailbox: &MailboxAddress, id: u64) -> Result<()> {
        let detail = self.provider.read_message(mailbox, id).await?;
        self.deliver_text(chat_id, &render_message_detail(&detail))
            .await
    }

    async fn try_download(
        &self,
        chat_id: ChatId,
        mailbox: &MailboxAddress,
        id: u64,
        filename: &str,
    ) -> Result<()> {
        let staged = StagedFile::reserve(&self.temp_dir, filename).await?;

        let mut file = tokio::fs::File::create(staged.path()).await?;
        let written = self
            .provider
            .download_attachment(mailbox, id, filename, &mut file)
            .await?;
        file.flush().await?;
        drop(file);
        tracing::debug!("Staged {written} bytes of {filename} for chat {}", chat_id.0);

        self.messenger
            .send_document(chat_id, staged.path(), filename)
            .await?;
        Ok(())
    }

    /// What a button (or a command typed without arguments) does.
    async fn run_argless(&self, chat_id: ChatId, action: Action) {
        match action {
            Action::Generate => self.generate_email(chat_id).await,
            Action::Domains => self.list_domains(chat_id).await,
            Action::Check | Action::Read | Action::Download => {
                if let Some(hint) = action.usage_hint() {
                    self.reply(chat_id, hint).await;
                }
            }
        }
    }

    async fn resolve_domain_selection(&self, chat_id: ChatId, domains: &[String], raw: &str) {
        let picked = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=domains.len()).contains(n))
            .map(|n| domains[n - 1].clone());

        let Some(domain) = picked else {
            return self.reply(chat_id, INVALID_SELECTION).await;
        };

        tracing::info!("Chat {} selected domain {domain}", chat_id.0);
        let confirmation = format!("You selected: {domain}");
        self.sessions.select_domain(chat_id, domain).await;
        self.reply(chat_id, &confirmation).await;
    }

    /// Run one action, turning any failure into a log line plus the action's
    /// generic reply.
    async fn guarded(
        &self,
        chat_id: ChatId,
        action: Action,
        fut: impl Future<Output = Result<()>>,
    ) {
        if let Err(e) = fut.await {
            tracing::error!("Error in {}: {e}", action.command());
            self.reply(chat_id, action.failure_message()).await;
        }
    }

    async fn deliver_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        for chunk in split_text(text, self.text_limit) {
            self.messenger.send_text(chat_id, &chunk).await?;
        }
        Ok(())
    }

    /// Best-effort reply; a failed send is only logged.
    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.deliver_text(chat_id, text).await {
            tracing::warn!("Failed to reply to chat {}: {e}", chat_id.0);
        }
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

/// Split on whitespace into at most `max` parts; the last part keeps the
/// remainder verbatim (file names may contain spaces).
fn split_args(args: &str, max: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = args.trim();
    while !rest.is_empty() {
        if out.len() + 1 == max {
            out.push(rest);
            break;
        }
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                out.push(head);
                rest = tail.trim_start();
            }
            None => {
                out.push(rest);
                break;
            }
        }
    }
    out
}
