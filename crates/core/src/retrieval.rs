//! Retriever trait: reference material for the knowledge context.
//!
//! Ranking, embeddings and ingestion are the backend's business. The query
//! pipeline only asks for the top-K documents for a query and renders what
//! comes back, in the order it came back.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A document returned by a retriever for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Document (or chunk) identifier
    pub id: String,

    /// The text content
    pub content: String,

    /// Human-readable source label (filename, URL, etc.)
    pub source: String,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Relevance score assigned by the retriever
    #[serde(default)]
    pub score: f32,
}

/// The core Retriever trait.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name (e.g., "keyword").
    fn name(&self) -> &str;

    /// Retrieve up to `top_k` documents relevant to `query`.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedDocument>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_deserializes_with_defaults() {
        let doc: RetrievedDocument = serde_json::from_str(
            r#"{"id":"d1","content":"resource blocks","source":"docs/resources.md"}"#,
        )
        .unwrap();
        assert_eq!(doc.id, "d1");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.score, 0.0);
    }
}
