//! Remote text-generation providers.
//!
//! Defines the [`TextGenerator`] trait and the shared request/error types
//! used by all provider implementations.
//!
//! - [`huggingface::HuggingFaceProvider`]: Hugging Face inference API
//!   (conversational and text-to-text tasks)
//! - [`router::FallbackChain`]: primary endpoint with one fallback

use async_trait::async_trait;
use regex::Regex;

pub mod huggingface;
pub mod router;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A request for generated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    /// The user message or the full prompt.
    pub prompt: String,
    /// Earlier user input used as conversational context.
    pub context: Option<String>,
}

impl GenerationRequest {
    /// Request for a bare prompt with no context.
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by text-generation providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure, including client-side timeouts.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// The payload was well-formed but carried an error or no text.
    #[error("provider returned no generated text: {0}")]
    NoText(String),
    /// The call exceeded its time budget.
    #[error("provider call timed out after {0} s")]
    Timeout(u64),
}

// ---------------------------------------------------------------------------
// HTTP helpers (useful for all providers)
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, redact token-like strings and cap the length.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [r"hf_[A-Za-z0-9]{16,}", r"Bearer\s+[A-Za-z0-9_\-\.]{16,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Remote text generation.
///
/// Implementations must be `Send + Sync` so one instance can serve the whole
/// conversation from behind an `Arc`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on network, status, or payload failure.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;

    /// Endpoint identifier for logs.
    fn endpoint(&self) -> &str;

    /// Sequential HTTP calls one `generate` may make in the worst case.
    fn attempts(&self) -> u32 {
        1
    }
}
