//! Configuration loading, validation, and management for TfPilot.
//!
//! Loads configuration from `~/.tfpilot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default ceiling on the assembled context, in estimated tokens.
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 8192;
/// Default number of prior exchanges (user + assistant pairs) to load.
pub const DEFAULT_HISTORY_DEPTH: usize = 5;
/// Default number of retrieved documents per query.
pub const DEFAULT_RETRIEVER_TOP_K: usize = 4;

/// The root configuration structure.
///
/// Maps directly to `~/.tfpilot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model backend settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Context assembly and query settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Conversation store configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Reference document configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("assistant", &self.assistant)
            .field("memory", &self.memory)
            .field("knowledge", &self.knowledge)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider label used in logs
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// OpenAI-compatible base URL (Ollama by default)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; local backends don't need one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// HTTP timeout for one streamed reply
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "ollama".into()
}
fn default_base_url() -> String {
    "http://localhost:11434/v1".into()
}
fn default_model() -> String {
    "llama3.1".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_timeout_secs() -> u64 {
    300
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_retriever_top_k")]
    pub retriever_top_k: usize,

    /// Prior exchanges to load; `history_depth * 2` turns are requested.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    /// File-name suffixes included in the workspace snapshot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Replace the built-in system prompt entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_retriever_top_k() -> usize {
    DEFAULT_RETRIEVER_TOP_K
}
fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}
fn default_max_context_tokens() -> usize {
    DEFAULT_MAX_CONTEXT_TOKENS
}
fn default_extensions() -> Vec<String> {
    vec![".tf".into(), ".tfvars".into()]
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            retriever_top_k: default_retriever_top_k(),
            history_depth: default_history_depth(),
            max_context_tokens: default_max_context_tokens(),
            extensions: default_extensions(),
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// One of `sqlite`, `file`, `in_memory`, `none`
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// Storage location; defaults to a file under the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_memory_backend() -> String {
    "sqlite".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: None,
        }
    }
}

impl MemoryConfig {
    /// The storage path to use, falling back to `~/.tfpilot/history.<ext>`.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        let file = match self.backend.as_str() {
            "file" => "history.jsonl",
            _ => "history.db",
        };
        AppConfig::config_dir().join(file)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// JSONL file of pre-chunked reference documents. Unset = no retriever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

const MEMORY_BACKENDS: &[&str] = &["sqlite", "file", "in_memory", "none"];

impl AppConfig {
    /// Load configuration from the default path (~/.tfpilot/config.toml).
    ///
    /// Environment variables override the file:
    /// - `TFPILOT_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `TFPILOT_BASE_URL`
    /// - `TFPILOT_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from a specific path, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(key) = env("TFPILOT_API_KEY").or_else(|| env("OPENAI_API_KEY")) {
            self.provider.api_key = Some(key);
        }
        if let Some(url) = env("TFPILOT_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(model) = env("TFPILOT_MODEL") {
            self.provider.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tfpilot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.assistant.max_context_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.max_context_tokens must be > 0".into(),
            ));
        }

        if self.assistant.history_depth == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.history_depth must be > 0".into(),
            ));
        }

        let extensions = &self.assistant.extensions;
        if extensions.is_empty() || extensions.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "assistant.extensions must list non-empty suffixes".into(),
            ));
        }

        if !MEMORY_BACKENDS.contains(&self.memory.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "memory.backend must be one of {}, got '{}'",
                MEMORY_BACKENDS.join(", "),
                self.memory.backend
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            assistant: AssistantConfig::default(),
            memory: MemoryConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
