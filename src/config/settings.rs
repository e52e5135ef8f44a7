//! Configuration settings for the Augury service.
//!
//! All settings are resolved once at startup — from a TOML file plus a
//! handful of environment overrides — and passed into each component as
//! an explicit struct. Nothing reads the process environment at call time.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub forecast: ForecastApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
            forecast: ForecastApiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("augury.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("augury/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("DB_PATH") {
            self.database.path = path;
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GROQ_MODEL") {
            self.llm.model = model;
        }
        if let Ok(key) = std::env::var("TIMEGPT_API_KEY") {
            self.forecast.api_key = Some(key);
        }
        if let Ok(port) = std::env::var("AUGURY_PORT") {
            if let Ok(port) = port.parse() {
                self.server.http_port = port;
            }
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.database.path.is_empty() {
            return Err(ConfigError::MissingField("database.path".to_string()).into());
        }
        if self.llm.api_key.is_some() {
            if self.llm.base_url.is_empty() {
                return Err(ConfigError::MissingField("llm.base_url".to_string()).into());
            }
            if self.llm.model.is_empty() {
                return Err(ConfigError::MissingField("llm.model".to_string()).into());
            }
        }
        if self.llm.timeout_secs == 0 || self.forecast.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be > 0".to_string()).into());
        }
        Ok(())
    }

    /// Expand the database path (tilde expansion only, no existence check).
    pub fn database_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.database.path);
        PathBuf::from(expanded.as_ref())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the HTTP server listens on.
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { http_port: 8000 }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "northwind.db".to_string(),
        }
    }
}

/// Chat-completion (LLM) API configuration.
///
/// The LLM is optional: with no API key configured the service runs
/// entirely on keyword classification and canned SQL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Full chat-completions endpoint URL (OpenAI-compatible).
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// API key. `None` disables the LLM paths entirely.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "gemma2-9b-it".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// Hosted forecasting API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastApiConfig {
    /// Forecast endpoint URL.
    pub base_url: String,
    /// API key. `None` makes the hosted backend fail fast, which routes
    /// every forecast to the classical fallback model.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ForecastApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.nixtla.io/forecast".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}
