//! Per-assistant tuning knobs.

use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use tfpilot_config::{
    AssistantConfig, DEFAULT_HISTORY_DEPTH, DEFAULT_MAX_CONTEXT_TOKENS, DEFAULT_RETRIEVER_TOP_K,
};

/// How much context a query may pull in, and how it is framed.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    /// Maximum knowledge documents per query.
    pub retriever_top_k: usize,
    /// Prior exchanges to load; each exchange is a user and an assistant turn.
    pub history_depth: usize,
    /// Token budget for the assembled message sequence.
    pub max_context_tokens: usize,
    /// File name suffixes picked up from the workspace.
    pub extensions: Vec<String>,
    pub system_prompt: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            retriever_top_k: DEFAULT_RETRIEVER_TOP_K,
            history_depth: DEFAULT_HISTORY_DEPTH,
            max_context_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
            extensions: vec![".tf".into(), ".tfvars".into()],
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AssistantSettings {
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            retriever_top_k: config.retriever_top_k,
            history_depth: config.history_depth,
            max_context_tokens: config.max_context_tokens,
            extensions: config.extensions.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }
}
