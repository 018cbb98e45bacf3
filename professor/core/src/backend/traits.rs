//! LLM Backend Traits
//!
//! Trait definitions for LLM backends. Course generation talks to whatever
//! provider is configured (OpenAI-compatible APIs, Ollama) through this one
//! interface.
//!
//! # Design Philosophy
//!
//! The `LlmBackend` trait provides a common interface for:
//! - Sending a chat conversation and receiving the full reply
//! - Reporting whether the backend is usable at all (credentials present)
//! - Health checking the provider
//!
//! Implementations handle provider-specific details (API formats, auth, etc.)

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who authored a prompt message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions for the model
    System,
    /// The learner or the application speaking for them
    User,
    /// A previous model reply
    Assistant,
}

/// One message of a chat prompt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Author
    pub role: ChatRole,
    /// Text
    pub content: String,
}

impl PromptMessage {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Configuration for LLM requests
#[derive(Clone, Debug, PartialEq)]
pub struct LlmRequest {
    /// Conversation, oldest first
    pub messages: Vec<PromptMessage>,
    /// Model to use (backend-specific identifier)
    pub model: String,
    /// Maximum tokens in response (0 = default)
    pub max_tokens: u32,
    /// Temperature (0.0-1.0, higher = more creative)
    pub temperature: f32,
}

impl Default for LlmRequest {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            model: String::new(),
            max_tokens: 0,
            temperature: 0.7,
        }
    }
}

impl LlmRequest {
    /// Create an empty request for a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Append a system message
    #[must_use]
    pub fn with_system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(PromptMessage::system(content));
        self
    }

    /// Append a user message
    #[must_use]
    pub fn with_user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(PromptMessage::user(content));
        self
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Response from an LLM request
#[derive(Clone, Debug, PartialEq)]
pub struct LlmResponse {
    /// The response text
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Response generation time in milliseconds
    pub duration_ms: Option<u64>,
}

/// LLM Backend trait
///
/// Implement this trait to add support for different LLM providers.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Get the backend name (e.g., "Ollama", "OpenAI")
    fn name(&self) -> &str;

    /// Whether requests can be made at all
    ///
    /// A backend missing its credentials reports `false`, and callers go
    /// straight to their fallbacks without touching the network.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Check if the backend is healthy and reachable
    async fn health_check(&self) -> bool;

    /// Send a request and wait for the complete response
    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse>;
}

#[async_trait]
impl<T: LlmBackend + ?Sized> LlmBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: LlmBackend + ?Sized> LlmBackend for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        (**self).send(request).await
    }
}

/// Pull a non-empty HTTP error body into an `anyhow` error
pub(crate) async fn error_for_status(provider: &str, response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{provider} returned {status}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_request_builder() {
        let request = LlmRequest::new("gpt-4o-mini")
            .with_system("You are helpful")
            .with_user("Hello")
            .with_temperature(0.4)
            .with_max_tokens(100);

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(
            request.messages,
            vec![PromptMessage::system("You are helpful"), PromptMessage::user("Hello")]
        );
        assert!((request.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 100);
    }

    #[test]
    fn test_temperature_is_clamped() {
        let request = LlmRequest::new("m").with_temperature(3.0);
        assert!((request.temperature - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_prompt_message_serializes_lowercase_role() {
        let json = serde_json::to_value(PromptMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
