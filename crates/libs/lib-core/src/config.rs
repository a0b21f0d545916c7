//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! Every value has a hardcoded default, so an empty environment yields a working
//! relay on port 3001 talking to a local Ollama. Values that are set but invalid
//! fail startup.
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::load()?;
//! println!("listening on {}", config.bind_address());
//! # Ok::<(), lib_core::AppError>(())
//! ```

use crate::error::{AppError, Result};
use lib_utils::{get_env_or, get_env_parse_or};
use std::time::Duration;

/// Default port, matching the clients' `BACKEND_URL`.
pub const DEFAULT_PORT: u16 = 3001;
/// Default inference service base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default model when a request names none.
pub const DEFAULT_MODEL: &str = "llama3.2";
/// Number of chat events retained and replayed to joiners.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Models advertised to clients. Informational only; any model name is forwarded.
pub const AVAILABLE_MODELS: &[&str] = &["llama3.2", "mistral", "codellama", "neural-chat"];

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Interface to bind, `0.0.0.0` by default
    pub bind_host: String,

    /// Listening port (`PORT`)
    pub port: u16,

    /// Base URL of the Ollama server (`OLLAMA_URL`)
    pub ollama_url: String,

    /// Model used when an `llm_message` names none
    pub default_model: String,

    /// Upper bound for one completion request, in seconds
    ///
    /// Valid range: 1-600
    pub llm_timeout_secs: u64,

    /// Sampling temperature sent with every completion request
    pub temperature: f32,

    /// Maximum generated tokens per completion
    pub max_tokens: u32,

    /// Most-recent-N bound of the chat history buffer
    pub history_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: 30,
            temperature: 0.7,
            max_tokens: 500,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config_err = |e: lib_utils::envs::Error| AppError::Config(e.to_string());

        Ok(Self {
            bind_host: get_env_or("BIND_HOST", &defaults.bind_host),
            port: get_env_parse_or("PORT", defaults.port).map_err(config_err)?,
            ollama_url: get_env_or("OLLAMA_URL", &defaults.ollama_url)
                .trim_end_matches('/')
                .to_string(),
            default_model: get_env_or("DEFAULT_MODEL", &defaults.default_model),
            llm_timeout_secs: get_env_parse_or("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)
                .map_err(config_err)?,
            temperature: get_env_parse_or("LLM_TEMPERATURE", defaults.temperature)
                .map_err(config_err)?,
            max_tokens: get_env_parse_or("LLM_MAX_TOKENS", defaults.max_tokens)
                .map_err(config_err)?,
            history_capacity: get_env_parse_or("HISTORY_CAPACITY", defaults.history_capacity)
                .map_err(config_err)?,
        })
    }

    /// Load from the process environment and validate.
    pub fn load() -> Result<Self> {
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::Config("PORT must be non-zero".to_string()));
        }

        if !(self.ollama_url.starts_with("http://") || self.ollama_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "OLLAMA_URL must start with http:// or https://, got {}",
                self.ollama_url
            )));
        }

        if self.default_model.trim().is_empty() {
            return Err(AppError::Config("DEFAULT_MODEL cannot be empty".to_string()));
        }

        if self.llm_timeout_secs < 1 || self.llm_timeout_secs > 600 {
            return Err(AppError::Config(
                "LLM_TIMEOUT_SECS must be between 1 and 600".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(
                "LLM_TEMPERATURE must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.history_capacity == 0 {
            return Err(AppError::Config("HISTORY_CAPACITY must be at least 1".to_string()));
        }

        Ok(())
    }

    /// `host:port` for the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
