//! Configuration management for pdf-quiz
//!
//! Handles model selection, endpoint settings and persistence of user
//! preferences. Credentials are never written to disk; the API key comes
//! from the environment or the command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable holding the model API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const MODEL_ENV: &str = "PDF_QUIZ_MODEL";
const ENDPOINT_ENV: &str = "PDF_QUIZ_ENDPOINT";
const RELAY_URL_ENV: &str = "PDF_QUIZ_RELAY_URL";

/// pdf-quiz configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Chat model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature (low favours well-formed JSON)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion token cap sent with each request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<u32>,
    /// Chat-completions endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout for the model call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Relay URL used when no API key is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,
    /// Version of config schema (for future migrations)
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> Option<u32> {
    Some(4000)
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            relay_url: None,
            version: default_version(),
        }
    }
}

impl Config {
    /// Get the config file path (~/.pdf-quiz/config.toml)
    pub fn path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.toml"))
    }

    /// Load config from disk, or return None if it doesn't exist
    pub fn load() -> Result<Option<Self>> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from disk (or defaults) and apply environment overrides
    pub fn resolve() -> Result<Self> {
        let mut config = Self::load()?.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Takes the lookup as a closure so tests don't touch process env.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty(MODEL_ENV) {
            self.model = model;
        }
        if let Some(endpoint) = non_empty(ENDPOINT_ENV) {
            self.endpoint = endpoint;
        }
        if let Some(relay) = non_empty(RELAY_URL_ENV) {
            self.relay_url = Some(relay);
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Temperature clamped to the range chat endpoints accept
    pub fn effective_temperature(&self) -> f32 {
        if self.temperature.is_nan() {
            return default_temperature();
        }
        self.temperature.clamp(0.0, 2.0)
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Read the API key from the environment, ignoring blank values
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Get the base directory path (~/.pdf-quiz)
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".pdf-quiz"))
}
