//! Context assembly: the exact message sequence sent to the model.
//!
//! One query's context is built from up to five parts:
//!
//! 1. **System prompt**: always present, never trimmed
//! 2. **Conversation history**: recent turns for the workspace, oldest dropped first
//! 3. **Retrieved knowledge**: one system message, present only if documents came back
//! 4. **Workspace files**: one system message, present only if files were found
//! 5. **User message**: always present, always last
//!
//! The final order is `[system, history.., knowledge?, workspace?, user]`.
//! Only history is ever trimmed to fit the token budget.
//!
//! Missing collaborators and collaborator failures degrade the context; they
//! never fail the query.

use crate::cancel::until_cancelled;
use crate::context::token;
use crate::context::workspace::{self, WorkspaceFile};
use crate::settings::AssistantSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tfpilot_core::error::Result;
use tfpilot_core::message::{ConversationTurn, Message};
use tfpilot_core::retrieval::{RetrievedDocument, Retriever};
use tfpilot_core::store::ConversationStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// ── Types ─────────────────────────────────────────────────────────────────

/// All inputs required by the assembler for a single query.
pub struct AssemblyInput<'a> {
    /// The current user message.
    pub user_message: &'a str,
    /// Absolute workspace directory, if the query is about one.
    pub workspace_dir: Option<&'a Path>,
    pub cancel: &'a CancellationToken,
}

/// The assembled context, ready for a provider request.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub messages: Vec<Message>,
    pub metadata: AssemblyMetadata,
}

/// What went into the context and what had to be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Estimated tokens of the final message sequence.
    pub total_tokens: usize,
    /// Configured token budget.
    pub budget: usize,
    /// History messages loaded from the store.
    pub history_loaded: usize,
    /// History messages that made it into the context.
    pub history_kept: usize,
    /// History messages dropped to fit the budget.
    pub history_dropped: usize,
    pub knowledge_documents: usize,
    pub workspace_files: usize,
    /// The untrimmable parts alone exceeded the budget.
    pub fixed_over_budget: bool,
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Builds the message sequence for one query. Holds no per-query state;
/// create one and reuse it.
pub struct ContextAssembler {
    settings: AssistantSettings,
    store: Option<Arc<dyn ConversationStore>>,
    retriever: Option<Arc<dyn Retriever>>,
}

impl ContextAssembler {
    pub fn new(settings: AssistantSettings) -> Self {
        Self {
            settings,
            store: None,
            retriever: None,
        }
    }

    /// Attach a conversation store for history.
    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach a retriever for reference knowledge.
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Assemble the context for one query.
    ///
    /// # Algorithm
    ///
    /// 1. Load up to `history_depth * 2` prior turns for the workspace
    /// 2. Retrieve up to `retriever_top_k` documents for the user message
    /// 3. Scan the workspace for matching files
    /// 4. Trim history (oldest first) so the whole sequence fits the budget
    /// 5. Return `[system, history.., knowledge?, workspace?, user]` + metadata
    ///
    /// Only cancellation and internal task failures are errors.
    pub async fn assemble(&self, input: &AssemblyInput<'_>) -> Result<AssembledContext> {
        let workspace_dir = workspace::non_empty(input.workspace_dir);
        let workspace_key = workspace::workspace_key(workspace_dir);

        // ── History ───────────────────────────────────────────────────────
        let turns = self.load_history(&workspace_key, input.cancel).await?;
        let history: Vec<Message> = turns.iter().filter_map(ConversationTurn::to_message).collect();

        // ── Knowledge ─────────────────────────────────────────────────────
        let documents = self.retrieve(input.user_message, input.cancel).await?;
        let knowledge_message = render_knowledge(&documents);

        // ── Workspace ─────────────────────────────────────────────────────
        let files = match workspace_dir {
            Some(dir) => {
                workspace::scan_workspace(dir, &self.settings.extensions, input.cancel).await?
            }
            None => Vec::new(),
        };
        let workspace_message = render_workspace(&files);

        // ── Budget ────────────────────────────────────────────────────────
        let system_message = Message::system(self.settings.system_prompt.clone());
        let user_message = Message::user(input.user_message);

        let mut fixed = vec![system_message.clone()];
        fixed.extend(knowledge_message.iter().cloned());
        fixed.extend(workspace_message.iter().cloned());
        fixed.push(user_message.clone());

        let budget = self.settings.max_context_tokens;
        let fixed_tokens = token::estimate_messages_tokens(&fixed);
        let fixed_over_budget = fixed_tokens > budget;
        if fixed_over_budget {
            warn!(
                fixed_tokens,
                budget, "System prompt, context and user message exceed the token budget"
            );
        }

        let trimmed = token::trim_history(&fixed, &history, budget);
        let dropped = history.len() - trimmed.len();
        if dropped > 0 {
            info!(dropped, budget, "Dropped oldest history to fit the token budget");
        }

        // ── Final sequence ────────────────────────────────────────────────
        let mut messages = Vec::with_capacity(fixed.len() + trimmed.len());
        messages.push(system_message);
        messages.extend(trimmed);
        messages.extend(knowledge_message);
        messages.extend(workspace_message);
        messages.push(user_message);

        let metadata = AssemblyMetadata {
            total_tokens: token::estimate_messages_tokens(&messages),
            budget,
            history_loaded: history.len(),
            history_kept: history.len() - dropped,
            history_dropped: dropped,
            knowledge_documents: documents.len(),
            workspace_files: files.len(),
            fixed_over_budget,
        };

        debug!(
            workspace = %workspace_key,
            messages = messages.len(),
            total_tokens = metadata.total_tokens,
            history = metadata.history_kept,
            knowledge = metadata.knowledge_documents,
            files = metadata.workspace_files,
            "Context assembled"
        );

        Ok(AssembledContext { messages, metadata })
    }

    // ── Private collaborators ─────────────────────────────────────────────

    async fn load_history(
        &self,
        workspace_key: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ConversationTurn>> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };
        let limit = self.settings.history_depth.saturating_mul(2);
        if limit == 0 {
            return Ok(Vec::new());
        }

        match until_cancelled(cancel, store.recent(workspace_key, limit)).await? {
            Ok(turns) => Ok(turns),
            Err(e) => {
                warn!(store = store.name(), error = %e, "Failed to load history, continuing without it");
                Ok(Vec::new())
            }
        }
    }

    async fn retrieve(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RetrievedDocument>> {
        let Some(retriever) = &self.retriever else {
            return Ok(Vec::new());
        };
        if self.settings.retriever_top_k == 0 {
            return Ok(Vec::new());
        }

        match until_cancelled(cancel, retriever.retrieve(query, self.settings.retriever_top_k))
            .await?
        {
            Ok(documents) => Ok(documents),
            Err(e) => {
                warn!(retriever = retriever.name(), error = %e, "Retrieval failed, continuing without knowledge");
                Ok(Vec::new())
            }
        }
    }
}

// ── Renderers ─────────────────────────────────────────────────────────────

fn render_knowledge(documents: &[RetrievedDocument]) -> Option<Message> {
    if documents.is_empty() {
        return None;
    }
    let body = documents
        .iter()
        .map(|d| format!("[Source: {}]\n{}", d.source, d.content))
        .collect::<Vec<_>>()
        .join("\n\n");
    Some(Message::system(format!("[Retrieved Knowledge]\n{body}")))
}

fn render_workspace(files: &[WorkspaceFile]) -> Option<Message> {
    if files.is_empty() {
        return None;
    }
    let body = files
        .iter()
        .map(|f| format!("--- {} ---\n{}", f.relative_path, f.content))
        .collect::<Vec<_>>()
        .join("\n");
    Some(Message::system(format!("[Workspace Files]\n{body}")))
}
