use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::ChatId;

/// Something the bot is waiting for the chat to answer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PendingAction {
    #[default]
    Idle,
    /// `/domains` was shown; the next text from this chat picks one of these.
    AwaitingDomainSelection { domains: Vec<String> },
}

/// Per-chat state, kept for the lifetime of the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatSession {
    pub selected_domain: Option<String>,
    pub pending: PendingAction,
}

/// Chat id -> session map.
///
/// Sessions are created on first write and never evicted. Callers only go
/// through these methods, so an eviction policy can be added here without
/// touching them.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<ChatId, ChatSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn selected_domain(&self, chat_id: ChatId) -> Option<String> {
        let map = self.inner.lock().await;
        map.get(&chat_id).and_then(|s| s.selected_domain.clone())
    }

    pub async fn select_domain(&self, chat_id: ChatId, domain: String) {
        let mut map = self.inner.lock().await;
        map.entry(chat_id).or_default().selected_domain = Some(domain);
    }

    /// Arm the one-shot domain selection for this chat, replacing any
    /// selection still pending.
    pub async fn await_domain_selection(&self, chat_id: ChatId, domains: Vec<String>) {
        let mut map = self.inner.lock().await;
        map.entry(chat_id).or_default().pending =
            PendingAction::AwaitingDomainSelection { domains };
    }

    /// Consume whatever this chat has pending, leaving it `Idle`.
    pub async fn take_pending(&self, chat_id: ChatId) -> PendingAction {
        let mut map = self.inner.lock().await;
        map.get_mut(&chat_id)
            .map(|s| std::mem::take(&mut s.pending))
            .unwrap_or_default()
    }

    pub async fn snapshot(&self, chat_id: ChatId) -> Option<ChatSession> {
        self.inner.lock().await.get(&chat_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_chat_has_no_domain_and_nothing_pending() {
        let store = SessionStore::new();
        assert_eq!(store.selected_domain(ChatId(1)).await, None);
        assert_eq!(store.take_pending(ChatId(1)).await, PendingAction::Idle);
        assert_eq!(store.snapshot(ChatId(1)).await, None);
    }

    #[tokio::test]
    async fn pending_selection_is_one_shot() {
        let store = SessionStore::new();
        let domains = vec!["a.com".to_string(), "b.com".to_string()];
        store.await_domain_selection(ChatId(7), domains.clone()).await;

        assert_eq!(
            store.take_pending(ChatId(7)).await,
            PendingAction::AwaitingDomainSelection { domains }
        );
        assert_eq!(store.take_pending(ChatId(7)).await, PendingAction::Idle);
    }

    #[tokio::test]
    async fn pending_selection_is_scoped_to_its_chat() {
        let store = SessionStore::new();
        store
            .await_domain_selection(ChatId(1), vec!["a.com".to_string()])
            .await;

        assert_eq!(store.take_pending(ChatId(2)).await, PendingAction::Idle);
        assert!(matches!(
            store.take_pending(ChatId(1)).await,
            PendingAction::AwaitingDomainSelection { .. }
        ));
    }

    #[tokio::test]
    async fn selecting_keeps_pending_untouched() {
        let store = SessionStore::new();
        store.select_domain(ChatId(3), "c.com".to_string()).await;
        assert_eq!(
            store.selected_domain(ChatId(3)).await.as_deref(),
            Some("c.com")
        );
        assert_eq!(
            store.snapshot(ChatId(3)).await.map(|s| s.pending),
            Some(PendingAction::Idle)
        );
    }
}
