//! File-based store: persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `ConversationTurn`. Turns are loaded into
//! memory on open and appended to the file on every write, so the file is
//! both human-inspectable and append-only.
//!
//! Storage location: `~/.tfpilot/history.jsonl` unless configured.

use crate::in_memory::recent_from;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tfpilot_core::error::StoreError;
use tfpilot_core::message::{ConversationTurn, Role};
use tfpilot_core::store::ConversationStore;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed conversation store using JSONL (one JSON object per line).
pub struct FileStore {
    path: PathBuf,
    turns: Arc<RwLock<Vec<ConversationTurn>>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// If the file exists, turns are loaded from it. If it does not, the
    /// store starts empty and the file is created on first append.
    pub fn new(path: PathBuf) -> Self {
        let turns = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = turns.len(), "File conversation store loaded");
        Self {
            path,
            turns: Arc::new(RwLock::new(turns)),
        }
    }

    /// Load turns from a JSONL file.
    fn load_from_disk(path: &Path) -> Vec<ConversationTurn> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<ConversationTurn>(line) {
                Ok(turn) => Some(turn),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted conversation turn");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl ConversationStore for FileStore {
    fn name(&self) -> &str {
        "file"
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
        let turn = ConversationTurn::new(workspace_key, role, content);
        let mut line = serde_json::to_string(&turn)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize turn: {e}")))?;
        line.push('\n');

        // Hold the write lock across the file append so lines never interleave.
        let mut turns = self.turns.write().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Storage(format!("Failed to create history directory: {e}"))
            })?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open history file: {e}")))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to append turn: {e}")))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to flush history file: {e}")))?;

        turns.push(turn);
        Ok(())
    }
}
