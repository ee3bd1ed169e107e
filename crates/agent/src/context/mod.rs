//! Context assembly for a single query.
//!
//! | Part | Source | Trim Strategy |
//! |------|--------|---------------|
//! | System prompt | Settings | Never trimmed |
//! | Conversation history | Conversation store | Oldest turns dropped |
//! | Retrieved knowledge | Retriever | Never trimmed |
//! | Workspace files | Workspace directory | Never trimmed |
//! | User message | Caller | Never trimmed |

pub mod assembler;
pub mod token;
pub mod workspace;

pub use assembler::{AssembledContext, AssemblyInput, AssemblyMetadata, ContextAssembler};
pub use workspace::WorkspaceFile;
