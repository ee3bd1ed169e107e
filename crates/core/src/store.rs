//! Conversation store trait: the persisted-turn contract.
//!
//! The query pipeline only reads the most recent turns for a workspace and
//! appends new ones; how they are kept is up to the backend.

use crate::error::StoreError;
use crate::message::{ConversationTurn, Role};
use async_trait::async_trait;

/// The core ConversationStore trait.
///
/// Implementations: in-memory (for testing), JSONL file, SQLite.
/// Implementations must be safe for concurrent use; "most recent" is defined
/// by the backend's own monotonic append order.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "file", "in_memory").
    fn name(&self) -> &str;

    /// Up to `n` most recent turns for `workspace_key`, oldest first.
    async fn recent(
        &self,
        workspace_key: &str,
        n: usize,
    ) -> std::result::Result<Vec<ConversationTurn>, StoreError>;

    /// Append one turn for `workspace_key`.
    async fn append(
        &self,
        workspace_key: &str,
        role: Role,
        content: &str,
    ) -> std::result::Result<(), StoreError>;
}
