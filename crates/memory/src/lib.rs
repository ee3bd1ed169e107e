//! Conversation stores and the keyword retriever for TfPilot.

pub mod file_backend;
pub mod in_memory;
pub mod retriever;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file_backend::FileStore;
pub use in_memory::InMemoryStore;
pub use retriever::KeywordRetriever;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::sync::Arc;
use tfpilot_config::{KnowledgeConfig, MemoryConfig};
use tfpilot_core::error::Error;
use tfpilot_core::retrieval::Retriever;
use tfpilot_core::store::ConversationStore;
use tracing::info;

/// Build the conversation store selected by `config.backend`.
///
/// Returns `None` for the `none` backend: queries then run without history.
pub async fn build_store(
    config: &MemoryConfig,
) -> Result<Option<Arc<dyn ConversationStore>>, Error> {
    let store: Arc<dyn ConversationStore> = match config.backend.as_str() {
        "none" => return Ok(None),
        "in_memory" => Arc::new(InMemoryStore::new()),
        "file" => Arc::new(FileStore::new(config.resolved_path())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = config.resolved_path();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Cannot create history directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
            let url = format!("sqlite://{}", path.display());
            Arc::new(SqliteStore::new(&url).await?)
        }
        other => {
            return Err(Error::config(format!(
                "Unsupported memory backend '{other}'"
            )));
        }
    };

    info!(backend = store.name(), "Conversation store ready");
    Ok(Some(store))
}

/// Build the knowledge retriever, if a document file is configured.
pub async fn build_retriever(
    config: &KnowledgeConfig,
) -> Result<Option<Arc<dyn Retriever>>, Error> {
    let Some(path) = &config.path else {
        return Ok(None);
    };
    let retriever = KeywordRetriever::from_jsonl(path).await?;
    info!(documents = retriever.len(), "Knowledge retriever ready");
    Ok(Some(Arc::new(retriever)))
}
