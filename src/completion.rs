//! Completion client implementations.
//!
//! Concrete [`CompletionClient`]s for the services SmartCart can talk to:
//! - **[`DisabledClient`]**: always unavailable; used when `provider = "disabled"`.
//! - **[`OllamaClient`]**: `POST /api/generate` on an Ollama server.
//! - **[`OpenAiClient`]**: `POST /v1/chat/completions` on any
//!   OpenAI-compatible endpoint.
//!
//! # Provider Selection
//!
//! Use [`create_client`] to build the client named by the configuration:
//!
//! ```rust
//! # use smartcart::config::CompletionConfig;
//! # use smartcart::completion::create_client;
//! # use smartcart_core::CompletionClient;
//! let config = CompletionConfig {
//!     provider: "disabled".to_string(),
//!     ..CompletionConfig::default()
//! };
//! let client = create_client(&config).unwrap();
//! assert_eq!(client.model_name(), "disabled");
//! ```
//!
//! # Timeouts and Retries
//!
//! Every request carries the `timeout_secs` bound; an expired bound is
//! reported as [`CompletionError::Timeout`]. Transient failures are retried
//! up to `max_retries` times with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors and timeouts → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use smartcart_core::{CompletionClient, CompletionError};

use crate::config::CompletionConfig;

/// Build the [`CompletionClient`] named by `config.provider`.
///
/// # Errors
///
/// Returns an error for unknown provider names, when the OpenAI provider is
/// selected without `OPENAI_API_KEY`, or when the HTTP client cannot be
/// built.
pub fn create_client(config: &CompletionConfig) -> Result<Arc<dyn CompletionClient>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledClient)),
        "ollama" => Ok(Arc::new(OllamaClient::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiClient::new(config)?)),
        other => bail!("Unknown completion provider: {}", other),
    }
}

// ============ Disabled ============

/// A client that always reports the service as unavailable.
pub struct DisabledClient;

#[async_trait]
impl CompletionClient for DisabledClient {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::unavailable("completion provider is disabled"))
    }
}

// ============ Shared HTTP plumbing ============

struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
    bearer: Option<String>,
    timeout: Duration,
    max_retries: u32,
}

impl HttpEndpoint {
    fn new(config: &CompletionConfig, path: &str, bearer: Option<String>) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", config.base_url_or_default(), path),
            bearer,
            timeout,
            max_retries: config.max_retries,
        })
    }

    /// POST `body` as JSON and return the parsed JSON response, retrying
    /// transient failures.
    async fn post_json(&self, body: &Value) -> Result<Value, CompletionError> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, ?delay, "retrying completion request");
                tokio::time::sleep(delay).await;
            }

            let mut req = self.client.post(&self.url).json(body);
            if let Some(key) = &self.bearer {
                req = req.bearer_auth(key);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<Value>().await.map_err(|e| {
                            if e.is_timeout() {
                                CompletionError::Timeout(self.timeout)
                            } else {
                                CompletionError::unavailable(format!(
                                    "invalid response body: {}",
                                    e
                                ))
                            }
                        });
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = CompletionError::unavailable(format!(
                        "completion API error {}: {}",
                        status, body_text
                    ));

                    // Rate limited or server error: retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(%status, "completion request failed");
                        last_err = Some(err);
                        continue;
                    }

                    return Err(err);
                }
                Err(e) => {
                    warn!(error = %e, "completion request failed");
                    last_err = Some(if e.is_timeout() {
                        CompletionError::Timeout(self.timeout)
                    } else {
                        CompletionError::unavailable(e.to_string())
                    });
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| CompletionError::unavailable("completion failed after retries")))
    }
}

// ============ Ollama ============

/// Client for Ollama's non-streaming generate endpoint.
pub struct OllamaClient {
    model: String,
    endpoint: HttpEndpoint,
}

impl OllamaClient {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        Ok(Self {
            model: config.model_or_default(),
            endpoint: HttpEndpoint::new(config, "/api/generate", None)?,
        })
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        let json = self.endpoint.post_json(&body).await?;
        parse_ollama_response(&json)
    }
}

/// Extract the `response` field from an Ollama generate reply.
fn parse_ollama_response(json: &Value) -> Result<String, CompletionError> {
    json.get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CompletionError::unavailable("invalid Ollama response: missing response"))
}

// ============ OpenAI-compatible ============

/// Client for OpenAI-compatible chat completion endpoints.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAiClient {
    model: String,
    endpoint: HttpEndpoint,
}

impl OpenAiClient {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &CompletionConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            model: config.model_or_default(),
            endpoint: HttpEndpoint::new(config, "/v1/chat/completions", Some(api_key))?,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let json = self.endpoint.post_json(&body).await?;
        parse_openai_response(&json)
    }
}

/// Extract `choices[0].message.content` from a chat completion reply.
fn parse_openai_response(json: &Value) -> Result<String, CompletionError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            CompletionError::unavailable("invalid OpenAI response: missing choices[0].message.content")
        })
}
