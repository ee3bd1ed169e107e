//! # TfPilot Core
//!
//! Domain types, collaborator traits, and error definitions for the TfPilot
//! assistant. This crate has **no framework dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator of the query pipeline is a trait here:
//! - [`Provider`]: the model stream
//! - [`ConversationStore`]: persisted conversational turns
//! - [`Retriever`]: reference documents for the knowledge context
//!
//! Implementations live in their respective crates, so the pipeline can be
//! tested with in-process fakes and wired to real backends by configuration.

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{ArtifactError, Error, ProviderError, Result, RetrievalError, StoreError};
pub use message::{ConversationTurn, Message, Role};
pub use provider::{Provider, ProviderRequest, StreamChunk, Usage};
pub use retrieval::{RetrievedDocument, Retriever};
pub use store::ConversationStore;
