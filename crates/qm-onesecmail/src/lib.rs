//! 1secmail adapter.
//!
//! Every operation is a single GET against the API base URL with an `action`
//! query parameter (`genRandomMailbox`, `getDomainList`, `getMessages`,
//! `readMessage`, `download`).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use qm_core::{
    errors::Error,
    mailbox::{MailboxAddress, MessageDetail, MessageSummary},
    provider::MailProvider,
    Result,
};

#[derive(Clone, Debug)]
pub struct OneSecMailClient {
    base_url: String,
    http: reqwest::Client,
}

impl OneSecMailClient {
    /// `timeout: None` keeps reqwest's defaults.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Provider(format!("http client build failed: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, action: &str, params: &[(&str, String)]) -> Result<reqwest::Response> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("action", action)])
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("{action} request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "{action} failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        self.get(action, params)
            .await?
            .json::<T>()
            .await
            .map_err(|e| Error::Provider(format!("{action} json error: {e}")))
    }
}

fn mailbox_params(mailbox: &MailboxAddress) -> Vec<(&'static str, String)> {
    vec![
        ("login", mailbox.login.clone()),
        ("domain", mailbox.domain.clone()),
    ]
}

#[async_trait]
impl MailProvider for OneSecMailClient {
    async fn gen_random_mailbox(&self, count: u32) -> Result<Vec<String>> {
        self.get_json("genRandomMailbox", &[("count", count.to_string())])
            .await
    }

    async fn get_domain_list(&self) -> Result<Vec<String>> {
        self.get_json("getDomainList", &[]).await
    }

    async fn get_messages(&self, mailbox: &MailboxAddress) -> Result<Vec<MessageSummary>> {
        self.get_json("getMessages", &mailbox_params(mailbox)).await
    }

    async fn read_message(&self, mailbox: &MailboxAddress, id: u64) -> Result<MessageDetail> {
        let mut params = mailbox_params(mailbox);
        params.push(("id", id.to_string()));
        self.get_json("readMessage", &params).await
    }

    async fn download_attachment(
        &self,
        mailbox: &MailboxAddress,
        id: u64,
        filename: &str,
        out: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64> {
        let mut params = mailbox_params(mailbox);
        params.push(("id", id.to_string()));
        params.push(("file", filename.to_string()));

        let mut resp = self.get("download", &params).await?;

        let mut written = 0u64;
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| Error::Provider(format!("download stream error: {e}")))?
        {
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> OneSecMailClient {
        OneSecMailClient::new(format!("{}/", server.url()), None).unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> Matcher {
        Matcher::AllOf(
            pairs
                .iter()
                .map(|(k, v)| Matcher::UrlEncoded(k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn mailbox() -> MailboxAddress {
        MailboxAddress::parse("user@1secmail.com").unwrap()
    }

    #[tokio::test]
    async fn gen_random_mailbox_sends_count() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/")
            .match_query(query(&[("action", "genRandomMailbox"), ("count", "1")]))
            .with_header("content-type", "application/json")
            .with_body(r#"["abc123@1secmail.org"]"#)
            .create_async()
            .await;

        let out = client_for(&server).gen_random_mailbox(1).await.unwrap();
        assert_eq!(out, vec!["abc123@1secmail.org".to_string()]);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn domain_list_is_decoded_in_order() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/")
            .match_query(query(&[("action", "getDomainList")]))
            .with_body(r#"["1secmail.com","1secmail.org","esiix.com"]"#)
            .create_async()
            .await;

        let out = client_for(&server).get_domain_list().await.unwrap();
        assert_eq!(out, vec!["1secmail.com", "1secmail.org", "esiix.com"]);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn get_messages_passes_login_and_domain() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/")
            .match_query(query(&[
                ("action", "getMessages"),
                ("login", "user"),
                ("domain", "1secmail.com"),
            ]))
            .with_body(
                r#"[{"id":639,"from":"someone@example.com","subject":"Some subject","date":"2018-06-08 14:33:55"}]"#,
            )
            .create_async()
            .await;

        let out = client_for(&server).get_messages(&mailbox()).await.unwrap();
        assert_eq!(
            out,
            vec![MessageSummary {
                id: 639,
                from: "someone@example.com".to_string(),
                subject: "Some subject".to_string(),
                date: "2018-06-08 14:33:55".to_string(),
            }]
        );
        m.assert_async().await;
    }

    #[tokio::test]
    async fn read_message_decodes_attachments() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/")
            .match_query(query(&[
                ("action", "readMessage"),
                ("login", "user"),
                ("domain", "1secmail.com"),
                ("id", "639"),
            ]))
            .with_body(
                r#"{"id":639,"from":"someone@example.com","subject":"Some subject","date":"2018-06-08 14:33:55",
                    "attachments":[{"filename":"iometer.pdf","contentType":"application/pdf","size":47412}],
                    "body":"Some message body\n\n","textBody":"Some message body\n\n","htmlBody":""}"#,
            )
            .create_async()
            .await;

        let detail = client_for(&server)
            .read_message(&mailbox(), 639)
            .await
            .unwrap();
        assert_eq!(detail.body, "Some message body\n\n");
        assert_eq!(detail.attachments.len(), 1);
        assert_eq!(detail.attachments[0].filename, "iometer.pdf");
        assert_eq!(detail.attachments[0].size, 47412);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_a_provider_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = client_for(&server).get_domain_list().await.unwrap_err();
        let Error::Provider(msg) = &err else {
            panic!("expected provider error, got {err:?}");
        };
        assert!(msg.contains("getDomainList failed"));
        assert!(msg.contains("503"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_provider_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client_for(&server).gen_random_mailbox(1).await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn download_streams_bytes_and_encodes_filename() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/")
            .match_query(query(&[
                ("action", "download"),
                ("login", "user"),
                ("domain", "1secmail.com"),
                ("id", "639"),
                ("file", "my report.pdf"),
            ]))
            .with_body(payload.clone())
            .create_async()
            .await;

        let mut sink: Vec<u8> = Vec::new();
        let written = client_for(&server)
            .download_attachment(&mailbox(), 639, "my report.pdf", &mut sink)
            .await
            .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(sink, payload);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_server_is_a_provider_error() {
        let client = OneSecMailClient::new("http://127.0.0.1:1/", None).unwrap();
        let err = client.get_domain_list().await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }
}
