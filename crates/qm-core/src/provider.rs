use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::{
    mailbox::{MailboxAddress, MessageDetail, MessageSummary},
    Result,
};

/// Port for the temporary-mail HTTP API.
///
/// Each call is exactly one request: no retries, no caching. Transport
/// errors, non-success statuses and undecodable bodies all surface as
/// `Error::Provider`.
#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn gen_random_mailbox(&self, count: u32) -> Result<Vec<String>>;

    async fn get_domain_list(&self) -> Result<Vec<String>>;

    async fn get_messages(&self, mailbox: &MailboxAddress) -> Result<Vec<MessageSummary>>;

    async fn read_message(&self, mailbox: &MailboxAddress, id: u64) -> Result<MessageDetail>;

    /// Stream an attachment into `out`, returning the number of bytes written.
    async fn download_attachment(
        &self,
        mailbox: &MailboxAddress,
        id: u64,
        filename: &str,
        out: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64>;
}
