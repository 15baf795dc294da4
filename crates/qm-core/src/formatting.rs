//! Formatting of provider responses into chat messages.

use crate::mailbox::{MessageDetail, MessageSummary};

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub const WELCOME: &str = "Welcome to QuickMail Bot!\n\n\
Here are some things you can do:\n\
• Generate a random temporary email for your needs\n\
• Get a list of active domains and choose one for your email\n\
• Check your mailbox by providing the email address\n\
• Read an email by providing the email address and message ID\n\
• Download an attachment by providing the email, message ID, and filename";

/// Confirmation for a new address (HTML).
pub fn render_generated(email: &str) -> String {
    format!(
        "<b>Email Generated:</b>\n<code>{}</code>\n\n<i>Your temporary email is ready to use!</i>",
        escape_html(email)
    )
}

/// 1-indexed domain list with the `/select` prompt.
pub fn render_domain_list(domains: &[String]) -> String {
    let list = domains
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. {d}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Active domains:\n{list}\n\nReply with /select <number> to choose a domain.")
}

pub fn render_message_list(messages: &[MessageSummary]) -> String {
    if messages.is_empty() {
        return "No messages found.".to_string();
    }
    let list = messages
        .iter()
        .map(|m| {
            format!(
                "ID: {}\nFrom: {}\nSubject: {}\nDate: {}",
                m.id, m.from, m.subject, m.date
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Messages:\n\n{list}")
}

pub fn render_message_detail(detail: &MessageDetail) -> String {
    let mut out = format!(
        "From: {}\nSubject: {}\nDate: {}\n\nBody:\n{}",
        detail.from, detail.subject, detail.date, detail.body
    );

    if !detail.attachments.is_empty() {
        let list = detail
            .attachments
            .iter()
            .map(|a| format!("Filename: {}, Size: {} bytes", a.filename, a.size))
            .collect::<Vec<_>>()
            .join("\n");
        out.push_str("\n\nAttachments:\n");
        out.push_str(&list);
    }

    out
}

/// Split `text` into chunks of at most `limit` characters, preferring line
/// boundaries. Lines longer than `limit` are cut hard.
pub fn split_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut out: Vec<String> = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0usize;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if chunk_len + line_len > limit && !chunk.is_empty() {
            flush_chunk(&mut out, &mut chunk);
            chunk_len = 0;
        }

        if line_len <= limit {
            chunk.push_str(line);
            chunk_len += line_len;
            continue;
        }

        for ch in line.chars() {
            if chunk_len == limit {
                flush_chunk(&mut out, &mut chunk);
                chunk_len = 0;
            }
            chunk.push(ch);
            chunk_len += 1;
        }
    }

    flush_chunk(&mut out, &mut chunk);
    out
}

fn flush_chunk(out: &mut Vec<String>, chunk: &mut String) {
    let taken = std::mem::take(chunk);
    let trimmed = taken.trim_end_matches('\n');
    if !trimmed.trim().is_empty() {
        out.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::AttachmentRef;

    fn detail(attachments: Vec<AttachmentRef>) -> MessageDetail {
        MessageDetail {
            from: "alice@example.com".to_string(),
            subject: "Hello".to_string(),
            date: "2024-05-01 10:00:00".to_string(),
            body: "Hi there".to_string(),
            attachments,
        }
    }

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn generated_address_is_code_styled_and_escaped() {
        let html = render_generated("a<b@c.com");
        assert!(html.contains("<code>a&lt;b@c.com</code>"));
        assert!(html.starts_with("<b>Email Generated:</b>"));
    }

    #[test]
    fn domain_list_is_one_indexed() {
        let domains = vec!["a.com".to_string(), "b.com".to_string()];
        assert_eq!(
            render_domain_list(&domains),
            "Active domains:\n1. a.com\n2. b.com\n\nReply with /select <number> to choose a domain."
        );
    }

    #[test]
    fn empty_mailbox_says_so() {
        assert_eq!(render_message_list(&[]), "No messages found.");
    }

    #[test]
    fn message_list_separates_entries_with_blank_line() {
        let msgs = vec![
            MessageSummary {
                id: 1,
                from: "a@x".to_string(),
                subject: "one".to_string(),
                date: "d1".to_string(),
            },
            MessageSummary {
                id: 2,
                from: "b@x".to_string(),
                subject: "two".to_string(),
                date: "d2".to_string(),
            },
        ];
        assert_eq!(
            render_message_list(&msgs),
            "Messages:\n\nID: 1\nFrom: a@x\nSubject: one\nDate: d1\n\nID: 2\nFrom: b@x\nSubject: two\nDate: d2"
        );
    }

    #[test]
    fn detail_without_attachments_has_no_section() {
        let out = render_message_detail(&detail(vec![]));
        assert!(!out.contains("Attachments:"));
        assert!(out.ends_with("Body:\nHi there"));
    }

    #[test]
    fn detail_lists_attachments_in_order() {
        let out = render_message_detail(&detail(vec![
            AttachmentRef {
                filename: "a.pdf".to_string(),
                size: 10,
            },
            AttachmentRef {
                filename: "b.png".to_string(),
                size: 20,
            },
        ]));
        assert!(out.ends_with(
            "\n\nAttachments:\nFilename: a.pdf, Size: 10 bytes\nFilename: b.png, Size: 20 bytes"
        ));
    }

    #[test]
    fn split_text_keeps_short_text_whole() {
        assert_eq!(split_text("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn split_text_prefers_line_boundaries() {
        let chunks = split_text("aaaa\nbbbb\ncccc", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn split_text_cuts_long_lines() {
        let chunks = split_text(&"x".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }
}
