//! # Chat State Management
//!
//! Application state shared by every chat handler.

use super::gateway::{CompletionGateway, GatewaySettings, InferenceClient};
use super::ollama::OllamaClient;
use super::relay::ChatRelay;
use lib_core::Config;
use std::sync::Arc;

/// Application state for the chat module
pub struct ChatAppState {
    pub relay: Arc<ChatRelay>,
    pub config: Config,
}

impl ChatAppState {
    /// Build state around an explicit inference backend.
    pub fn new(config: Config, client: Arc<dyn InferenceClient>) -> Self {
        let gateway = CompletionGateway::new(client, GatewaySettings::from(&config));
        let relay = Arc::new(ChatRelay::new(config.history_capacity, gateway));
        Self { relay, config }
    }

    /// Build state talking to the Ollama server named in `config`.
    pub fn with_ollama(config: Config) -> anyhow::Result<Self> {
        let client = OllamaClient::new(&config.ollama_url, config.llm_timeout())?;
        Ok(Self::new(config, Arc::new(client)))
    }
}
