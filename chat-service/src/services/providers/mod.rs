//! AI provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for text generation backends,
//! allowing the chat responder to swap between Gemini and a scripted mock.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
///
/// The `Display` text of each variant is what callers see after `"Error: "`,
/// so transport and API variants carry their description verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    ApiError(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("{0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a provider response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    /// Generated text, `None` when the backend produced nothing usable.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Finish reason.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishReason {
    #[default]
    Complete,
    Length,
    ContentFilter,
    Error,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Complete => "complete",
            FinishReason::Length => "length",
            FinishReason::ContentFilter => "content_filter",
            FinishReason::Error => "error",
        }
    }
}

/// Generation parameters for AI requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// System instruction prepended to every conversation.
    pub system_instruction: Option<String>,

    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Generate a text response for a single user message.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
