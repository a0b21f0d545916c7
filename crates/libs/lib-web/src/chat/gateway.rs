//! # Completion Gateway
//!
//! Brokers one completion request to the inference service and turns the
//! outcome into exactly one chat event: `llm` on success, `error` on timeout,
//! network failure or a bad response. Failures are never fatal to the relay.
//!
//! The HTTP call sits behind [`InferenceClient`] so the gateway's timeout and
//! mapping rules hold for any backend.

use super::events::{error_event, llm_event};
use super::hub::BroadcastHub;
use async_trait::async_trait;
use lib_core::Config;
use shared::dto::{ChatEvent, ServerEvent, TypingStatus};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

/// Why a completion produced no text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Inference service returned status {0}: {1}")]
    Status(u16, String),

    #[error("Invalid response from inference service: {0}")]
    InvalidResponse(String),
}

/// One outbound generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text-generation backend.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Generate a completion for `request`; the returned text is the reply.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError>;
}

/// Fixed generation parameters applied to every request.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub default_model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&Config> for GatewaySettings {
    fn from(config: &Config) -> Self {
        Self {
            default_model: config.default_model.clone(),
            timeout: config.llm_timeout(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

pub struct CompletionGateway {
    client: Arc<dyn InferenceClient>,
    settings: GatewaySettings,
}

impl CompletionGateway {
    pub fn new(client: Arc<dyn InferenceClient>, settings: GatewaySettings) -> Self {
        Self { client, settings }
    }

    /// The requested model, or the default when none (or a blank name) is given.
    pub fn resolve_model(&self, model: Option<&str>) -> String {
        model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.settings.default_model)
            .to_string()
    }

    /// Issue one request, bounded by the configured timeout, and map the outcome.
    ///
    /// On expiry the in-flight request is dropped; there is no retry.
    pub async fn complete(&self, prompt: &str, model: Option<&str>) -> ChatEvent {
        let request = GenerateRequest {
            model: self.resolve_model(model),
            prompt: prompt.to_string(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.settings.timeout, self.client.generate(&request))
            .await
            .unwrap_or(Err(GatewayError::Timeout(self.settings.timeout)));

        match outcome {
            Ok(text) => {
                info!(
                    model = %request.model,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    response_len = text.len(),
                    "[LLM] completion succeeded"
                );
                llm_event(&request.model, text)
            }
            Err(e) => {
                warn!(
                    model = %request.model,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "[LLM] completion failed"
                );
                error_event(e)
            }
        }
    }

    /// [`complete`](Self::complete) wrapped in a typing started/stopped pair.
    ///
    /// The stop signal is sent whatever the outcome, before the result is returned.
    pub async fn run(&self, prompt: &str, model: Option<&str>, hub: &BroadcastHub) -> ChatEvent {
        hub.broadcast_all(ServerEvent::LlmTyping(TypingStatus { is_typing: true }))
            .await;
        let event = self.complete(prompt, model).await;
        hub.broadcast_all(ServerEvent::LlmTyping(TypingStatus { is_typing: false }))
            .await;
        event
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted [`InferenceClient`] stand-in.

    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub enum Script {
        Reply(String),
        Fail(GatewayError),
        /// Never answers; only the gateway timeout ends the call
        Hang,
    }

    pub struct ScriptedClient {
        script: Script,
        pub requests: Mutex<Vec<GenerateRequest>>,
    }

    impl ScriptedClient {
        pub fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn reply(text: &str) -> Arc<Self> {
            Self::new(Script::Reply(text.to_string()))
        }
    }

    #[async_trait]
    impl InferenceClient for ScriptedClient {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                Script::Fail(e) => Err(e.clone()),
                Script::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    pub fn settings(timeout: Duration) -> GatewaySettings {
        GatewaySettings {
            default_model: "llama3.2".to_string(),
            timeout,
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}
