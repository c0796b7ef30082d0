//! Configuration loading and management for pagesumma.
//!
//! Loads settings from `pagesumma.toml` with environment variable overrides for sensitive data.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Prompt used when neither the trigger nor the settings store provide one.
pub const DEFAULT_PROMPT: &str = "Summarize this page so I can decide if I should read the full article. \
Use short sentences and be direct and to the point. Ensure main takeaways are included as well as \
key people/places/tools/media that are mentioned. You do not need to be exhaustive. \
Do not add detail or references not already on the page.";

/// Request prompt for the code explainer; not affected by the custom-prompt flag.
pub const EXPLAIN_PROMPT: &str = "Explain the following code in a few bullet points:";

/// System instruction sent with every code explanation request.
pub const EXPLAIN_SYSTEM: &str =
    "You are an expert at understanding and explaining in multiple programming languages.";

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Remote generative-text endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL, without the `/models/...` suffix
    pub endpoint: String,
    /// Model identifier (e.g., "gemini-2.0-flash")
    pub model: String,
    /// Request deadline in seconds, at least 1
    pub timeout_secs: u64,
}

/// Controller behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Whether a prompt carried by the trigger is honoured
    pub supports_custom_prompt: bool,
    /// Built-in prompt
    pub default_prompt: String,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Storage paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the settings database
    pub path: PathBuf,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default location, or defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                let mut config = Config::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env();
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override API keys from environment variables
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.api.gemini_key = Some(key);
            }
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from("pagesumma.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home = dirs::home_dir()?;
        let home_config = home
            .join(".config")
            .join("pagesumma")
            .join("pagesumma.toml");
        home_config.exists().then_some(home_config)
    }
}

impl ProviderConfig {
    /// Request deadline; zero reads as one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            supports_custom_prompt: true,
            default_prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
        }
    }
}
