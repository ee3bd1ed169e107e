//! Shared test doubles for the query pipeline.

use async_trait::async_trait;
use std::sync::Mutex;
use tfpilot_core::error::{ProviderError, RetrievalError, StoreError};
use tfpilot_core::message::{ConversationTurn, Role};
use tfpilot_core::provider::{ChunkReceiver, Provider, ProviderRequest, StreamChunk};
use tfpilot_core::retrieval::{RetrievedDocument, Retriever};
use tfpilot_core::store::ConversationStore;
use tokio::sync::mpsc;

type ScriptedItem = Result<StreamChunk, ProviderError>;

/// A provider that replays a scripted stream and remembers what it was asked.
pub struct ScriptedProvider {
    script: Vec<ScriptedItem>,
    start_error: Mutex<Option<ProviderError>>,
    /// Keeps the channel open after the script, so the stream never ends.
    hang: bool,
    held: Mutex<Vec<mpsc::Sender<ScriptedItem>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<ScriptedItem>) -> Self {
        Self {
            script,
            start_error: Mutex::new(None),
            hang: false,
            held: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stream `fragments` as text chunks, then a `done` chunk.
    pub fn text(fragments: &[&str]) -> Self {
        let mut script: Vec<ScriptedItem> = fragments
            .iter()
            .map(|f| Ok(StreamChunk::text(*f)))
            .collect();
        script.push(Ok(StreamChunk::finished(None)));
        Self::new(script)
    }

    /// Fail before any chunk is produced.
    pub fn failing_to_start(error: ProviderError) -> Self {
        let provider = Self::new(Vec::new());
        *provider.start_error.lock().unwrap() = Some(error);
        provider
    }

    /// Send `fragments` and then never finish.
    pub fn hanging(fragments: &[&str]) -> Self {
        let mut provider = Self::new(
            fragments
                .iter()
                .map(|f| Ok(StreamChunk::text(*f)))
                .collect(),
        );
        provider.hang = true;
        provider
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        self.requests.lock().unwrap().push(request);

        if let Some(error) = self.start_error.lock().unwrap().take() {
            return Err(error);
        }

        let (tx, rx) = mpsc::channel(self.script.len().max(1));
        for item in &self.script {
            tx.try_send(item.clone()).unwrap();
        }
        if self.hang {
            self.held.lock().unwrap().push(tx);
        }
        Ok(rx)
    }
}

/// A retriever that always returns the same documents.
pub struct StaticRetriever {
    documents: Vec<RetrievedDocument>,
}

impl StaticRetriever {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    async fn retrieve(
        &self,
        _query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }
}

pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    fn name(&self) -> &str {
        "failing"
    }

    async fn retrieve(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        Err(RetrievalError::Unavailable("index offline".into()))
    }
}

pub struct FailingStore;

#[async_trait]
impl ConversationStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn recent(
        &self,
        _workspace_key: &str,
        _n: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        Err(StoreError::QueryFailed("database is locked".into()))
    }

    async fn append(&self, _workspace_key: &str, _role: Role, _content: &str) -> Result<(), StoreError> {
        Err(StoreError::Storage("disk full".into()))
    }
}
