//! Reply classification: file-generation envelope or plain answer.
//!
//! A reply is structured only when the whole text decodes as
//!
//! ```json
//! {"files": [{"path": "main.tf", "content": "..."}], "summary": "..."}
//! ```
//!
//! with at least one file. Anything else, including fenced or partial JSON,
//! is plain text and passes through untouched.

use serde::{Deserialize, Serialize};

/// One file the model asked to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the workspace root, as supplied by the model.
    pub path: String,
    pub content: String,
}

/// The structured file-generation envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub files: Vec<GeneratedFile>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// How a finished reply should be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Files to materialize.
    Structured(AgentOutput),
    /// The reply text, unmodified.
    PlainText(String),
}

/// Classify a fully collected reply.
///
/// Decoding is only attempted when the query has a workspace to write into.
pub fn classify(text: String, has_workspace: bool) -> Classified {
    if !has_workspace {
        return Classified::PlainText(text);
    }

    match serde_json::from_str::<AgentOutput>(&text) {
        Ok(output) if !output.files.is_empty() => Classified::Structured(output),
        _ => Classified::PlainText(text),
    }
}
