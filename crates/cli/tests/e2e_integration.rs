//! End-to-end integration tests for TfPilot.
//!
//! These wire the real config loader, stores and retriever together the way
//! the CLI does, with a scripted provider standing in for the model server.

use std::sync::{Arc, Mutex};

use tfpilot_agent::{Assistant, AssistantSettings};
use tfpilot_config::AppConfig;
use tfpilot_core::error::ProviderError;
use tfpilot_core::message::{Message, Role};
use tfpilot_core::provider::{ChunkReceiver, Provider, ProviderRequest, StreamChunk};
use tokio_util::sync::CancellationToken;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that streams scripted replies in sequence.
struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request(&self, index: usize) -> ProviderRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .expect("ScriptedProvider: no more replies");

        let (tx, rx) = tokio::sync::mpsc::channel(reply.split_inclusive(' ').count() + 1);
        for word in reply.split_inclusive(' ') {
            tx.try_send(Ok(StreamChunk::text(word))).unwrap();
        }
        // No explicit done chunk: dropping tx closes the stream.
        Ok(rx)
    }
}

fn write_config(dir: &std::path::Path, memory_backend: &str) -> AppConfig {
    let history = dir.join("state").join("history.jsonl");
    let knowledge = dir.join("knowledge.jsonl");
    std::fs::write(
        &knowledge,
        [
            r#"{"id":"locking","content":"State locking prevents concurrent terraform apply runs.","source":"docs/state-locking.md"}"#,
            r#"{"id":"modules","content":"Modules package reusable resources.","source":"docs/modules.md"}"#,
        ]
        .join("\n"),
    )
    .unwrap();

    let config_path = dir.join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            "[provider]\nmodel = \"llama3.1\"\n\n[assistant]\nhistory_depth = 2\nretriever_top_k = 1\n\n[memory]\nbackend = \"{memory_backend}\"\npath = {history:?}\n\n[knowledge]\npath = {knowledge:?}\n",
        ),
    )
    .unwrap();

    AppConfig::load_from(&config_path).unwrap()
}

async fn assistant_from(config: &AppConfig, provider: Arc<ScriptedProvider>) -> Assistant {
    let mut assistant = Assistant::new(
        provider,
        config.provider.model.clone(),
        config.provider.temperature,
        AssistantSettings::from_config(&config.assistant),
    );
    if let Some(store) = tfpilot_memory::build_store(&config.memory).await.unwrap() {
        assistant = assistant.with_store(store);
    }
    if let Some(retriever) = tfpilot_memory::build_retriever(&config.knowledge).await.unwrap() {
        assistant = assistant.with_retriever(retriever);
    }
    assistant
}

fn roles(messages: &[Message]) -> Vec<Role> {
    messages.iter().map(Message::role).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_conversation_is_remembered_across_sessions() {
    let home = tempfile::tempdir().unwrap();
    let config = write_config(home.path(), "file");

    let first = ScriptedProvider::new(&["Enable a DynamoDB lock table."]);
    let mut out: Vec<u8> = Vec::new();
    assistant_from(&config, first.clone())
        .await
        .query("how do I stop concurrent apply runs?", None, &mut out, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Enable a DynamoDB lock table.");

    let knowledge = first.request(0).messages[1].content().to_string();
    assert!(knowledge.contains("[Source: docs/state-locking.md]"));
    assert!(!knowledge.contains("docs/modules.md"), "top_k is 1");

    // A fresh assistant over the same history file sees the earlier exchange.
    let second = ScriptedProvider::new(&["Yes, in the backend block."]);
    assistant_from(&config, second.clone())
        .await
        .query("does locking need the backend?", None, &mut tokio::io::sink(), &CancellationToken::new())
        .await
        .unwrap();

    let messages = second.request(0).messages;
    assert_eq!(
        roles(&messages),
        vec![Role::System, Role::User, Role::Assistant, Role::System, Role::User]
    );
    assert_eq!(messages[1].content(), "how do I stop concurrent apply runs?");
    assert_eq!(messages[2].content(), "Enable a DynamoDB lock table.");
}

#[tokio::test]
async fn e2e_generates_files_into_workspace() {
    let home = tempfile::tempdir().unwrap();
    let workspace = tempfile::tempdir().unwrap();
    std::fs::write(workspace.path().join("main.tf"), "terraform {}\n").unwrap();
    let config = write_config(home.path(), "in_memory");

    let envelope = serde_json::json!({
        "files": [
            {"path": "backend.tf", "content": "terraform {\n  backend \"s3\" {}\n}\n"},
            {"path": "modules/lock/main.tf", "content": "resource \"aws_dynamodb_table\" \"lock\" {}\n"}
        ],
        "summary": "Added an S3 backend with a lock table."
    })
    .to_string();

    let provider = ScriptedProvider::new(&[envelope.as_str()]);
    let mut out: Vec<u8> = Vec::new();
    let outcome = assistant_from(&config, provider.clone())
        .await
        .query(
            "add remote state with locking",
            Some(workspace.path()),
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(outcome.files_written);
    assert_eq!(String::from_utf8(out).unwrap(), "Added an S3 backend with a lock table.");
    assert!(
        std::fs::read_to_string(workspace.path().join("modules/lock/main.tf"))
            .unwrap()
            .contains("aws_dynamodb_table")
    );

    // The existing main.tf was part of the context.
    let last = provider.request(0).messages.len() - 2;
    assert!(provider.request(0).messages[last].content().contains("--- main.tf ---"));
}

#[tokio::test]
async fn e2e_memory_backend_none_runs_without_history() {
    let home = tempfile::tempdir().unwrap();
    let config = write_config(home.path(), "none");

    let provider = ScriptedProvider::new(&["one", "two"]);
    let assistant = assistant_from(&config, provider.clone()).await;
    for q in ["first", "second"] {
        assistant
            .query(q, None, &mut tokio::io::sink(), &CancellationToken::new())
            .await
            .unwrap();
    }

    // system, knowledge (maybe), user: never any history
    let messages = provider.request(1).messages;
    assert!(messages.iter().all(|m| m.role() != Role::Assistant));
    assert!(!home.path().join("state").exists());
}
