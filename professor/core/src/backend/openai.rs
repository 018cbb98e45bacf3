//! OpenAI-compatible Backend Implementation
//!
//! Talks to any server exposing the OpenAI chat completions API.
//!
//! # API
//!
//! - `POST /v1/chat/completions` - non-streaming chat completion
//! - `GET /v1/models` - used as a health probe
//!
//! Without an API key the backend reports itself disabled and never makes a
//! request.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::traits::{error_for_status, LlmBackend, LlmRequest, LlmResponse};

/// Public OpenAI endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Model used when none is configured
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible backend client
#[derive(Clone)]
pub struct OpenAiBackend {
    /// Bearer token; `None` disables the backend
    api_key: Option<String>,
    /// Scheme, host and port without a trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl OpenAiBackend {
    /// Create a backend
    ///
    /// Blank keys count as missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>, base_url: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            http_client,
        })
    }

    /// Get chat completions endpoint URL
    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Get models endpoint URL
    fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    /// Request body for a chat completion
    fn payload(request: &LlmRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });
        if request.max_tokens > 0 {
            body["max_tokens"] = serde_json::json!(request.max_tokens);
        }
        body
    }

    /// Reply text and token usage from a completion response
    fn extract(data: &serde_json::Value) -> anyhow::Result<(String, Option<u32>)> {
        let content = data
            .pointer("/choices/0/message/content")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("completion response has no message content"))?
            .to_string();
        let tokens_used = data
            .pointer("/usage/total_tokens")
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());
        Ok((content, tokens_used))
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn health_check(&self) -> bool {
        let Some(key) = &self.api_key else {
            return false;
        };
        self.http_client
            .get(self.models_url())
            .bearer_auth(key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        let Some(key) = &self.api_key else {
            anyhow::bail!("OpenAI backend has no API key");
        };
        let start = Instant::now();

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(key)
            .json(&Self::payload(request))
            .send()
            .await?;
        let response = error_for_status("OpenAI", response).await?;

        let data: serde_json::Value = response.json().await?;
        let (content, tokens_used) = Self::extract(&data)?;
        tracing::debug!(model = %request.model, tokens = ?tokens_used, "Chat completion received");

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            tokens_used,
            duration_ms: u64::try_from(start.elapsed().as_millis()).ok(),
        })
    }
}
