//! Mailbox addresses and the message records returned by the mail provider.

use std::fmt;

use rand::Rng;
use serde::Deserialize;

const LOCAL_PART_LEN: usize = 10;
const LOCAL_PART_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A provider mailbox, `login@domain`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MailboxAddress {
    pub login: String,
    pub domain: String,
}

impl MailboxAddress {
    /// Split `login@domain`. Both parts must be non-empty and the domain
    /// must not contain another `@`.
    pub fn parse(s: &str) -> Option<Self> {
        let (login, domain) = s.trim().split_once('@')?;
        if login.is_empty() || domain.is_empty() || domain.contains('@') {
            return None;
        }
        Some(Self {
            login: login.to_string(),
            domain: domain.to_string(),
        })
    }

    /// A fresh address on `domain` with a random lowercase alphanumeric login.
    ///
    /// Nothing is checked against the provider: mailboxes are created lazily
    /// on first access.
    pub fn random_on(domain: &str) -> Self {
        Self {
            login: random_local_part(),
            domain: domain.to_string(),
        }
    }
}

impl fmt::Display for MailboxAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.login, self.domain)
    }
}

pub fn random_local_part() -> String {
    let mut rng = rand::thread_rng();
    (0..LOCAL_PART_LEN)
        .map(|_| LOCAL_PART_CHARSET[rng.gen_range(0..LOCAL_PART_CHARSET.len())] as char)
        .collect()
}

/// One entry of a mailbox listing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MessageSummary {
    pub id: u64,
    pub from: String,
    pub subject: String,
    pub date: String,
}

/// A full message as returned by `readMessage`. `textBody`, `htmlBody` and
/// each attachment's `contentType` are not shown to users and are skipped.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MessageDetail {
    pub from: String,
    pub subject: String,
    pub date: String,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AttachmentRef {
    pub filename: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_requires_both_parts() {
        assert_eq!(
            MailboxAddress::parse("user@1secmail.com"),
            Some(MailboxAddress {
                login: "user".to_string(),
                domain: "1secmail.com".to_string(),
            })
        );
        assert_eq!(MailboxAddress::parse("bad-email"), None);
        assert_eq!(MailboxAddress::parse("@domain.com"), None);
        assert_eq!(MailboxAddress::parse("user@"), None);
        assert_eq!(MailboxAddress::parse("a@b@c"), None);
    }

    #[test]
    fn random_address_uses_selected_domain() {
        let addr = MailboxAddress::random_on("b.com");
        assert_eq!(addr.domain, "b.com");
        assert_eq!(addr.login.len(), 10);
        assert!(addr
            .login
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(addr.to_string().ends_with("@b.com"));
    }

    #[test]
    fn random_local_parts_differ() {
        assert_ne!(random_local_part(), random_local_part());
    }

    #[test]
    fn detail_without_attachments_field_decodes_to_empty() {
        let raw = r#"{"id":1,"from":"a@b.c","subject":"s","date":"2024-01-01 00:00:00","body":"hi"}"#;
        let detail: MessageDetail = serde_json::from_str(raw).unwrap();
        assert!(detail.attachments.is_empty());
        assert_eq!(detail.body, "hi");
    }

    #[test]
    fn detail_skips_unrendered_fields() {
        let raw = r#"{"id":1,"from":"a@b.c","subject":"s","date":"d","body":"hi",
            "textBody":"hi","htmlBody":"<p>hi</p>",
            "attachments":[{"filename":"a.pdf","contentType":"application/pdf","size":1024}]}"#;
        let detail: MessageDetail = serde_json::from_str(raw).unwrap();
        assert_eq!(
            detail.attachments,
            vec![AttachmentRef {
                filename: "a.pdf".to_string(),
                size: 1024,
            }]
        );
    }
}
