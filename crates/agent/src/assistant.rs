//! The query pipeline: assemble, stream, classify, then write or answer.

use crate::cancel::until_cancelled;
use crate::context::assembler::{AssemblyInput, AssemblyMetadata, ContextAssembler};
use crate::context::workspace;
use crate::materializer;
use crate::output::{Classified, classify};
use crate::persistence;
use crate::settings::AssistantSettings;
use crate::stream::ReplyStream;
use std::path::Path;
use std::sync::Arc;
use tfpilot_core::error::{ArtifactError, Error, Result};
use tfpilot_core::provider::{Provider, ProviderRequest, Usage};
use tfpilot_core::retrieval::Retriever;
use tfpilot_core::store::ConversationStore;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What a finished query did.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The reply was a file envelope and its files were written.
    pub files_written: bool,
    /// Relative paths written, in the order the model listed them.
    pub written_paths: Vec<String>,
    pub metadata: AssemblyMetadata,
    /// Token usage, when the provider reported it.
    pub usage: Option<Usage>,
}

/// A Terraform assistant bound to one provider and model.
pub struct Assistant {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per reply
    max_tokens: Option<u32>,

    assembler: ContextAssembler,

    /// Optional store for history and turn persistence
    store: Option<Arc<dyn ConversationStore>>,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            assembler: ContextAssembler::new(settings),
            store: None,
        }
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Attach a conversation store for history and persistence.
    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.assembler = self.assembler.with_store(Arc::clone(&store));
        self.store = Some(store);
        self
    }

    /// Attach a retriever for reference knowledge.
    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.assembler = self.assembler.with_retriever(retriever);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer one user message.
    ///
    /// A file envelope reply is written into `workspace_dir` and only its
    /// summary goes to `sink`. Any other reply goes to `sink` verbatim and
    /// is recorded as a user/assistant exchange.
    pub async fn query(
        &self,
        user_message: &str,
        workspace_dir: Option<&Path>,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<QueryOutcome> {
        let workspace_dir = workspace::non_empty(workspace_dir);
        let workspace_key = workspace::workspace_key(workspace_dir);
        info!(workspace = %workspace_key, model = %self.model, "Query started");

        // 1. Context
        let context = self
            .assembler
            .assemble(&AssemblyInput {
                user_message,
                workspace_dir,
                cancel,
            })
            .await?;

        // 2. Stream
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: context.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let receiver = until_cancelled(cancel, self.provider.stream(request)).await??;

        // 3. Collect
        let mut reply = ReplyStream::new(receiver);
        let text = reply.collect(cancel).await?;
        let usage = reply.usage().cloned();
        drop(reply);

        // 4. Classify, 5. deliver
        let outcome = match (classify(text, workspace_dir.is_some()), workspace_dir) {
            (Classified::Structured(output), Some(dir)) => {
                let written = materializer::materialize(&output, dir, cancel).await?;
                if let Some(summary) = &output.summary {
                    write_to_sink(sink, summary).await?;
                }
                QueryOutcome {
                    files_written: true,
                    written_paths: written,
                    metadata: context.metadata,
                    usage,
                }
            }
            (Classified::Structured(output), None) => {
                // classify() never decodes without a workspace
                return Err(Error::Internal(format!(
                    "Structured reply with {} files but no workspace",
                    output.files.len()
                )));
            }
            (Classified::PlainText(text), _) => {
                write_to_sink(sink, &text).await?;
                persistence::record_exchange(
                    self.store.as_deref(),
                    &workspace_key,
                    user_message,
                    &text,
                )
                .await;
                QueryOutcome {
                    files_written: false,
                    written_paths: Vec::new(),
                    metadata: context.metadata,
                    usage,
                }
            }
        };

        info!(
            workspace = %workspace_key,
            files_written = outcome.files_written,
            files = outcome.written_paths.len(),
            "Query finished"
        );
        Ok(outcome)
    }
}

async fn write_to_sink(sink: &mut (dyn AsyncWrite + Unpin + Send), text: &str) -> Result<()> {
    sink.write_all(text.as_bytes())
        .await
        .map_err(|e| ArtifactError::Sink(e.to_string()))?;
    sink.flush()
        .await
        .map_err(|e| ArtifactError::Sink(e.to_string()))?;
    debug!(bytes = text.len(), "Reply delivered");
    Ok(())
}
