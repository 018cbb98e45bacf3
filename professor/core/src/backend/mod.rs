//! LLM Backend Integration
//!
//! This module provides abstracted access to LLM backends (OpenAI-compatible
//! APIs, Ollama) through a common trait interface.
//!
//! # Available Backends
//!
//! - **OpenAI**: `/v1/chat/completions` on api.openai.com or any compatible server (default)
//! - **Ollama**: Local LLM server
//!
//! # Usage
//!
//! ```ignore
//! use professor_core::backend::{build_backend, LlmBackend, LlmRequest};
//!
//! let backend = build_backend(&config.llm)?;
//! let request = LlmRequest::new("gpt-4o-mini").with_user("Hello!");
//! let reply = backend.send(&request).await?;
//! ```

mod ollama;
mod openai;
mod traits;

pub use ollama::{OllamaBackend, DEFAULT_OLLAMA_MODEL, OLLAMA_BASE_URL};
pub use openai::{OpenAiBackend, DEFAULT_OPENAI_MODEL, OPENAI_BASE_URL};
pub use traits::{ChatRole, LlmBackend, LlmRequest, LlmResponse, PromptMessage};

use crate::config::{LlmProvider, LlmSettings};

/// Build the backend described by the LLM settings
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_backend(settings: &LlmSettings) -> anyhow::Result<Box<dyn LlmBackend>> {
    let timeout = settings.request_timeout();
    let backend: Box<dyn LlmBackend> = match settings.provider {
        LlmProvider::OpenAi => Box::new(OpenAiBackend::new(
            settings.api_key.clone(),
            settings.base_url.clone(),
            timeout,
        )?),
        LlmProvider::Ollama => {
            let base_url = settings
                .base_url
                .clone()
                .unwrap_or_else(OllamaBackend::base_url_from_env);
            Box::new(OllamaBackend::new(base_url, timeout)?)
        }
    };
    tracing::info!(
        backend = backend.name(),
        model = settings.model(),
        enabled = backend.is_enabled(),
        "LLM backend ready"
    );
    Ok(backend)
}
