//! # Ollama HTTP Client
//!
//! [`InferenceClient`] backed by Ollama's non-streaming `POST /api/generate`.

use super::gateway::{GatewayError, GenerateRequest, InferenceClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Longest upstream error body echoed into a chat message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    response: String,
}

pub struct OllamaClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Create a client for `base_url` (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        debug!(url = %url, model = %request.model, "[LLM] POST /api/generate");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let mut detail = response.text().await.unwrap_or_default();
            if detail.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !detail.is_char_boundary(cut) {
                    cut -= 1;
                }
                detail.truncate(cut);
            }
            return Err(GatewayError::Status(status.as_u16(), detail));
        }

        let reply: GenerateReply = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.timeout)
            } else {
                GatewayError::InvalidResponse(e.to_string())
            }
        })?;

        if reply.response.trim().is_empty() {
            return Err(GatewayError::InvalidResponse("empty completion".to_string()));
        }

        Ok(reply.response)
    }
}
