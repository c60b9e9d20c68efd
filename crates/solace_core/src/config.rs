//! Configuration types for a solace data directory.

use crate::error::{Result, SolaceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Configuration for a solace data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Storage-related configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Completion service configuration.
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Config {
    /// Load configuration from `<root>/config.toml`, or defaults if absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let config: Config = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| SolaceError::Config(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| SolaceError::Config(format!("failed to parse config: {}", e)))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `<root>/config.toml`.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)
            .map_err(|e| SolaceError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| SolaceError::Config(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.users_file.trim().is_empty() {
            return Err(SolaceError::Config("storage.users_file must not be empty".into()));
        }
        self.completion.validate()
    }

    /// Path of the user data file for a data directory.
    pub fn users_path(&self, root: &Path) -> PathBuf {
        root.join(&self.storage.users_file)
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// User data file, relative to the data directory (default: users.json).
    pub users_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_file: "users.json".to_string(),
        }
    }
}

/// Completion service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Model id sent with every request (default: o4-mini).
    pub model: String,

    /// Default system instructions.
    pub instructions: String,

    /// Retries allowed for transient failures (default: 3).
    pub max_retries: u32,

    /// Backoff base; retry `n` waits `backoff_base^n` seconds (default: 2.0).
    pub backoff_base: f64,

    /// Service base URL; requests go to `{base_url}/responses`.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Per-request timeout in seconds. `0` disables it.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "o4-mini".to_string(),
            instructions: "You are a helpful, step-by-step reasoning assistant.".to_string(),
            max_retries: 3,
            backoff_base: 2.0,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl CompletionConfig {
    /// Per-request timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(SolaceError::Config("completion.model must not be empty".into()));
        }
        if !self.backoff_base.is_finite() || self.backoff_base < 1.0 {
            return Err(SolaceError::Config(format!(
                "completion.backoff_base must be at least 1.0, got {}",
                self.backoff_base
            )));
        }
        Ok(())
    }
}
