//! In-memory store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::sync::Arc;
use tfpilot_core::error::StoreError;
use tfpilot_core::message::{ConversationTurn, Role};
use tfpilot_core::store::ConversationStore;
use tokio::sync::RwLock;

/// A store that keeps turns in a Vec, in append order.
pub struct InMemoryStore {
    turns: Arc<RwLock<Vec<ConversationTurn>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            turns: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every stored turn, across all workspaces, in append order.
    pub async fn all(&self) -> Vec<ConversationTurn> {
        self.turns.read().await.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The last `n` turns for `workspace_key`, oldest first.
pub(crate) fn recent_from(
    turns: &[ConversationTurn],
    workspace_key: &str,
    n: usize,
) -> Vec<ConversationTurn> {
    let mut recent: Vec<ConversationTurn> = turns
        .iter()
        .rev()
        .filter(|t| t.workspace_key == workspace_key)
        .take(n)
        .cloned()
        .collect();
    recent.reverse();
    recent
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn recent(
        &self,
        workspace_key: &str,
        n: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let turns = self.turns.read().await;
        Ok(recent_from(&turns, workspace_key, n))
    }

    async fn append(&self, workspace_key: &str, role: Role, content: &str) -> Result<(), StoreError> {
        self.turns
            .write()
            .await
            .push(ConversationTurn::new(workspace_key, role, content));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recent_returns_oldest_first() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.append("/ws", Role::User, &format!("q{i}")).await.unwrap();
        }

        let recent = store.recent("/ws", 3).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q2", "q3", "q4"]);
    }

    #[tokio::test]
    async fn recent_is_scoped_by_workspace() {
        let store = InMemoryStore::new();
        store.append("/a", Role::User, "for a").await.unwrap();
        store.append("/b", Role::User, "for b").await.unwrap();
        store.append("", Role::User, "no workspace").await.unwrap();

        let a = store.recent("/a", 10).await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].content, "for a");

        let none = store.recent("", 10).await.unwrap();
        assert_eq!(none.len(), 1);
        assert_eq!(none[0].content, "no workspace");
    }

    #[tokio::test]
    async fn recent_with_zero_limit_is_empty() {
        let store = InMemoryStore::new();
        store.append("/ws", Role::User, "q").await.unwrap();
        assert!(store.recent("/ws", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn roles_are_stored_by_name() {
        let store = InMemoryStore::new();
        store.append("/ws", Role::User, "q").await.unwrap();
        store.append("/ws", Role::Assistant, "a").await.unwrap();

        let all = store.all().await;
        assert_eq!(all[0].role, "user");
        assert_eq!(all[1].role, "assistant");
    }
}
