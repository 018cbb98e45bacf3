//! Ollama Backend Implementation
//!
//! LLM backend for Ollama (local LLM server).
//!
//! # Ollama API
//!
//! - `/api/chat` - Chat completions with message history
//! - `/api/tags` - List available models (used as a health probe)
//!
//! This implementation uses the chat endpoint without streaming.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::traits::{error_for_status, LlmBackend, LlmRequest, LlmResponse};

/// Default local Ollama address
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
/// Model used when none is configured
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Ollama backend client
#[derive(Clone, Debug)]
pub struct OllamaBackend {
    /// Scheme, host and port without a trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Address from `OLLAMA_HOST` / `OLLAMA_PORT`, defaulting to localhost
    #[must_use]
    pub fn base_url_from_env() -> String {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port: u16 = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(11434);
        format!("http://{host}:{port}")
    }

    /// Get chat endpoint URL
    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Get tags endpoint URL
    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    /// Request body for a chat call
    fn payload(request: &LlmRequest) -> serde_json::Value {
        let mut options = serde_json::json!({ "temperature": request.temperature });
        if request.max_tokens > 0 {
            options["num_predict"] = serde_json::json!(request.max_tokens);
        }
        serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": false,
            "options": options,
        })
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.tags_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(self.chat_url())
            .json(&Self::payload(request))
            .send()
            .await?;
        let response = error_for_status("Ollama", response).await?;

        let data: serde_json::Value = response.json().await?;

        let content = data
            .pointer("/message/content")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
            .to_string();

        let tokens_used = data
            .get("eval_count")
            .and_then(serde_json::Value::as_u64)
            .and_then(|c| u32::try_from(c).ok());

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            tokens_used,
            duration_ms: u64::try_from(start.elapsed().as_millis()).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_backend_creation() {
        let backend = OllamaBackend::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url, "http://localhost:11434");
        assert_eq!(backend.chat_url(), "http://localhost:11434/api/chat");
        assert_eq!(backend.tags_url(), "http://localhost:11434/api/tags");
        assert!(backend.is_enabled());
    }

    #[test]
    fn test_payload_options() {
        let request = LlmRequest::new("llama3.2").with_user("Hello").with_temperature(0.4);
        let body = OllamaBackend::payload(&request);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body["options"].get("num_predict").is_none());

        let body = OllamaBackend::payload(&request.with_max_tokens(64));
        assert_eq!(body["options"]["num_predict"], 64);
    }
}
