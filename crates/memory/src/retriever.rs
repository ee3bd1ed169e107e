//! Keyword retriever over pre-chunked reference documents.
//!
//! Documents are held in memory, either supplied directly or loaded from a
//! JSONL file (one `RetrievedDocument` per line). Scoring is plain
//! case-insensitive term overlap; there is no embedding and no ingestion.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use tfpilot_core::error::RetrievalError;
use tfpilot_core::retrieval::{RetrievedDocument, Retriever};
use tracing::{debug, warn};

/// Ranks documents by how many distinct query terms they contain.
pub struct KeywordRetriever {
    documents: Vec<RetrievedDocument>,
}

impl KeywordRetriever {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self { documents }
    }

    /// Load documents from a JSONL file. Malformed lines are skipped.
    pub async fn from_jsonl(path: &Path) -> Result<Self, RetrievalError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            RetrievalError::Unavailable(format!(
                "Failed to read knowledge file {}: {e}",
                path.display()
            ))
        })?;

        let documents: Vec<RetrievedDocument> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed knowledge document");
                    None
                }
            })
            .collect();

        debug!(path = %path.display(), count = documents.len(), "Knowledge documents loaded");
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Lowercased alphanumeric terms; `_` and `-` are kept so identifiers like
/// `aws_instance` stay whole.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Retriever for KeywordRetriever {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        let query_terms = terms(query);
        if query_terms.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, RetrievedDocument)> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let doc_terms = terms(&doc.content);
                let overlap = query_terms.intersection(&doc_terms).count();
                (overlap > 0).then(|| {
                    let mut doc = doc.clone();
                    doc.score = overlap as f32 / query_terms.len() as f32;
                    (overlap, doc)
                })
            })
            .collect();

        // Stable sort: equal scores keep document order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, doc)| doc).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn doc(id: &str, content: &str) -> RetrievedDocument {
        RetrievedDocument {
            id: id.into(),
            content: content.into(),
            source: format!("{id}.md"),
            metadata: Default::default(),
            score: 0.0,
        }
    }

    fn corpus() -> KeywordRetriever {
        KeywordRetriever::new(vec![
            doc("vpc", "The aws_vpc resource creates a VPC"),
            doc("s3", "Use aws_s3_bucket for an S3 bucket"),
            doc("state", "Remote state is stored in an S3 backend bucket"),
        ])
    }

    #[tokio::test]
    async fn ranks_by_term_overlap() {
        let results = corpus().retrieve("s3 bucket backend", 3).await.unwrap();
        let ids: Vec<_> = results.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["state", "s3"]);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let results = corpus().retrieve("VPC", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "vpc");
    }

    #[tokio::test]
    async fn ties_keep_document_order() {
        let retriever = KeywordRetriever::new(vec![
            doc("first", "terraform module"),
            doc("second", "terraform provider"),
        ]);
        let results = retriever.retrieve("terraform", 5).await.unwrap();
        assert_eq!(results[0].id, "first");
        assert_eq!(results[1].id, "second");
    }

    #[tokio::test]
    async fn respects_top_k() {
        let results = corpus().retrieve("s3 bucket", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(corpus().retrieve("s3", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_match_returns_empty() {
        assert!(corpus().retrieve("kubernetes", 4).await.unwrap().is_empty());
        assert!(corpus().retrieve("  ", 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn loads_jsonl_and_skips_bad_lines() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, r#"{{"id":"a","content":"output values","source":"outputs.md"}}"#).unwrap();
        writeln!(tmp, "not json").unwrap();
        writeln!(tmp).unwrap();
        writeln!(tmp, r#"{{"id":"b","content":"input variables","source":"variables.md"}}"#).unwrap();

        let retriever = KeywordRetriever::from_jsonl(tmp.path()).await.unwrap();
        assert_eq!(retriever.len(), 2);

        let results = retriever.retrieve("variables", 4).await.unwrap();
        assert_eq!(results[0].source, "variables.md");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = KeywordRetriever::from_jsonl(&dir.path().join("absent.jsonl")).await;
        assert!(matches!(result, Err(RetrievalError::Unavailable(_))));
    }
}
