//! Configuration management for NeuroCare.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NeuroCareError, Result};
use crate::mood::ProfileContext;

/// Top-level NeuroCare configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NeuroCareConfig {
    /// Primary chat service (mood-log scoped).
    #[serde(default)]
    pub primary: ServiceConfig,

    /// Secondary chatbot service (user scoped).
    #[serde(default)]
    pub secondary: ServiceConfig,

    /// Session behaviour.
    #[serde(default)]
    pub session: SessionSettings,

    /// Stored user / mood state, the local stand-in for the questionnaire.
    #[serde(default)]
    pub profile: ProfileContext,
}

/// Address of a remote chat service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Session-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Upper bound on each remote tier attempt.
    #[serde(default = "default_tier_timeout_secs")]
    pub tier_timeout_secs: u64,

    /// Name shown next to assistant messages and the typing indicator.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
}

fn default_tier_timeout_secs() -> u64 {
    15
}

fn default_bot_name() -> String {
    "NeuroCare AI".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tier_timeout_secs: default_tier_timeout_secs(),
            bot_name: default_bot_name(),
        }
    }
}

impl NeuroCareConfig {
    /// Load config from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| NeuroCareError::Config(format!("Failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| NeuroCareError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| NeuroCareError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neurocare")
            .join("config.toml")
    }
}
