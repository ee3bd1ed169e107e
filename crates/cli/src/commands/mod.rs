pub mod ask;
pub mod chat;
pub mod history;
pub mod onboard;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tfpilot_agent::{Assistant, AssistantSettings};
use tfpilot_config::AppConfig;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load configuration from `--config` or the default location.
pub fn load_config(path: Option<&Path>) -> CliResult<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

/// The config file `onboard` writes and the other commands read.
pub fn config_file(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Resolve `--workspace` to an existing, absolute directory.
pub fn resolve_workspace(workspace: Option<PathBuf>) -> CliResult<Option<PathBuf>> {
    let Some(dir) = workspace else {
        return Ok(None);
    };
    let dir = std::fs::canonicalize(&dir)
        .map_err(|e| format!("Workspace {} is not accessible: {e}", dir.display()))?;
    if !dir.is_dir() {
        return Err(format!("Workspace {} is not a directory", dir.display()).into());
    }
    Ok(Some(dir))
}

/// Wire up provider, store and retriever from configuration.
pub async fn build_assistant(config: &AppConfig) -> CliResult<Assistant> {
    let provider = tfpilot_providers::build_from_config(config)?;

    let mut assistant = Assistant::new(
        provider,
        config.provider.model.clone(),
        config.provider.temperature,
        AssistantSettings::from_config(&config.assistant),
    );
    if let Some(max_tokens) = config.provider.max_tokens {
        assistant = assistant.with_max_tokens(max_tokens);
    }
    if let Some(store) = tfpilot_memory::build_store(&config.memory).await? {
        assistant = assistant.with_store(store);
    }
    if let Some(retriever) = tfpilot_memory::build_retriever(&config.knowledge).await? {
        assistant = assistant.with_retriever(retriever);
    }
    debug!(provider = %config.provider.name, memory = %config.memory.backend, "Assistant built");
    Ok(assistant)
}

/// Routes Ctrl-C for the rest of the process.
///
/// Once listening, the default SIGINT handler is gone for good, so a single
/// listener serves every query: Ctrl-C cancels the query in flight, or wakes
/// [`Interrupts::idle`] when nothing is running.
pub struct Interrupts {
    route: Arc<InterruptRoute>,
    listener: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct InterruptRoute {
    active: Mutex<Option<CancellationToken>>,
    idle: Notify,
}

impl InterruptRoute {
    fn interrupt(&self) {
        let active = match self.active.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        match active {
            Some(token) => token.cancel(),
            None => self.idle.notify_one(),
        }
    }

    fn set(&self, token: Option<CancellationToken>) {
        match self.active.lock() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl Interrupts {
    /// Install the Ctrl-C listener.
    pub fn listen() -> Self {
        let route = Arc::new(InterruptRoute::default());
        let handler = Arc::clone(&route);
        let listener = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                debug!("Ctrl-C received");
                handler.interrupt();
            }
        });
        Self {
            route,
            listener: Some(listener),
        }
    }

    /// A fresh token for the next query; Ctrl-C cancels it until [`finish`](Self::finish).
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        self.route.set(Some(token.clone()));
        token
    }

    pub fn finish(&self) {
        self.route.set(None);
    }

    /// Resolves on a Ctrl-C that arrived while no query was running.
    pub async fn idle(&self) {
        self.route.idle.notified().await;
    }
}

impl Drop for Interrupts {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
