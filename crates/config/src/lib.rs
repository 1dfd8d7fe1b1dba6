//! Configuration loading, validation, and management for memoclaw.
//!
//! Loads configuration from `~/.memoclaw/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.memoclaw/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the LLM provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Default chat model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Override the built-in assistant persona prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// Reasoning loop limits
    #[serde(default)]
    pub agent: AgentConfig,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_api_url() -> String {
    // Groq's OpenAI-compatible endpoint
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "llama3-8b-8192".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
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
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("agent", &self.agent)
            .field("memory", &self.memory)
            .finish()
    }
}

/// Reasoning loop limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum think→act→observe iterations per request
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Wall-clock ceiling for one request, in seconds
    #[serde(default = "default_max_execution_secs")]
    pub max_execution_secs: u64,
}

fn default_max_iterations() -> u32 {
    5
}
fn default_max_execution_secs() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_execution_secs: default_max_execution_secs(),
        }
    }
}

/// Memory subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Long-term store backend: "sqlite" or "memory"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// SQLite database path (ignored for the in-memory backend)
    #[serde(default = "default_memory_path")]
    pub path: String,

    /// Embedder: "feature_hash" (local, deterministic) or "provider"
    #[serde(default = "default_embedder")]
    pub embedder: String,

    /// Embedding model name when `embedder = "provider"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,

    /// Long-term memories recalled per request
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,

    /// Exchanges retained per session window
    #[serde(default = "default_window_exchanges")]
    pub window_exchanges: usize,

    /// Maximum sessions held in the window cache before LRU eviction
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
}

fn default_memory_backend() -> String {
    "sqlite".into()
}
fn default_memory_path() -> String {
    "~/.memoclaw/memory.db".into()
}
fn default_embedder() -> String {
    "feature_hash".into()
}
fn default_recall_limit() -> usize {
    3
}
fn default_window_exchanges() -> usize {
    5
}
fn default_session_capacity() -> usize {
    1024
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: default_memory_path(),
            embedder: default_embedder(),
            embedding_model: None,
            recall_limit: default_recall_limit(),
            window_exchanges: default_window_exchanges(),
            session_capacity: default_session_capacity(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.memoclaw/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `MEMOCLAW_API_KEY` (highest priority)
    /// - `GROQ_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("MEMOCLAW_API_KEY")
                .ok()
                .or_else(|| std::env::var("GROQ_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("MEMOCLAW_API_URL") {
            config.api_url = url;
        }

        if let Ok(model) = std::env::var("MEMOCLAW_MODEL") {
            config.default_model = model;
        }

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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".memoclaw")
    }

    /// Resolve the memory database path, expanding a leading `~`.
    pub fn memory_db_path(&self) -> PathBuf {
        if let Some(rest) = self.memory.path.strip_prefix("~/") {
            dirs_home().join(rest)
        } else {
            PathBuf::from(&self.memory.path)
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.memory.window_exchanges == 0 {
            return Err(ConfigError::ValidationError(
                "memory.window_exchanges must be at least 1".into(),
            ));
        }

        if self.memory.session_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "memory.session_capacity must be at least 1".into(),
            ));
        }

        match self.memory.backend.as_str() {
            "sqlite" | "memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown memory backend '{other}' (expected 'sqlite' or 'memory')"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            system_prompt_override: None,
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
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
