//! The TfPilot query pipeline.
//!
//! One query runs strictly in order:
//!
//! 1. **Assemble** the context (system prompt + history + knowledge + workspace files)
//! 2. **Stream** the reply from the configured provider
//! 3. **Classify** the reply as a file envelope or plain text
//! 4. **Deliver**: write the files into the workspace, or print the answer
//!    and record the exchange
//!
//! Collaborators other than the provider are optional; when they are missing
//! or failing the query degrades instead of failing.

mod cancel;
pub mod assistant;
pub mod context;
pub mod materializer;
pub mod output;
pub mod persistence;
pub mod prompt;
pub mod settings;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use assistant::{Assistant, QueryOutcome};
pub use context::{
    AssembledContext, AssemblyInput, AssemblyMetadata, ContextAssembler, WorkspaceFile,
};
pub use output::{AgentOutput, Classified, GeneratedFile, classify};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use settings::AssistantSettings;
pub use stream::ReplyStream;
