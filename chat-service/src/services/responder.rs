//! Chat responder: turns one user message into one response envelope.
//!
//! Provider failures never escape `respond`; they become response text
//! prefixed with `"Error: "`.

use crate::models::{ChatRequest, ChatResponse};
use crate::services::formatter::ResponseFormatter;
use crate::services::metrics::{self, ChatOutcome};
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use std::sync::Arc;
use std::time::Instant;

/// Returned when the provider produced no usable text.
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I couldn't understand that.";

/// Replaces the error description when redaction is enabled.
const REDACTED_ERROR: &str = "the assistant is temporarily unavailable";

#[derive(Clone)]
pub struct ChatResponder {
    provider: Arc<dyn TextProvider>,
    formatter: Arc<dyn ResponseFormatter>,
    params: GenerationParams,
    redact_errors: bool,
}

impl ChatResponder {
    pub fn new(provider: Arc<dyn TextProvider>, formatter: Arc<dyn ResponseFormatter>) -> Self {
        Self {
            provider,
            formatter,
            params: GenerationParams::default(),
            redact_errors: false,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_redacted_errors(mut self, redact_errors: bool) -> Self {
        self.redact_errors = redact_errors;
        self
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    /// Answer a parsed chat request. A `message` that is not a string is
    /// answered like a generation failure, without calling the provider.
    pub async fn respond_to(&self, request: &ChatRequest) -> ChatResponse {
        match request.message_text() {
            Ok(message) => self.respond(Some(message)).await,
            Err(description) => self.answer("", Err(ProviderError::InvalidRequest(description))),
        }
    }

    /// Answer a single message. A missing message is treated as empty.
    pub async fn respond(&self, message: Option<&str>) -> ChatResponse {
        let message = message.unwrap_or_default();
        let result = self.generate(message).await;
        self.answer(message, result)
    }

    fn answer(
        &self,
        message: &str,
        result: Result<Option<String>, ProviderError>,
    ) -> ChatResponse {
        let (response, outcome) = match result {
            Ok(Some(text)) => (self.formatter.format(&text), ChatOutcome::Reply),
            Ok(None) => (FALLBACK_RESPONSE.to_string(), ChatOutcome::Fallback),
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error_type = e.kind(),
                    error = %e,
                    "Text generation failed"
                );
                metrics::record_provider_error(self.provider.name(), e.kind());
                (self.describe_failure(&e), ChatOutcome::Error)
            }
        };

        metrics::record_outcome(outcome);
        tracing::debug!(
            outcome = outcome.as_str(),
            message_len = message.len(),
            response_len = response.len(),
            "Chat message answered"
        );

        ChatResponse { response }
    }

    /// Non-empty generated text, or `None` when there is nothing to format.
    async fn generate(&self, message: &str) -> Result<Option<String>, ProviderError> {
        let started = Instant::now();
        let result = self.provider.generate(message, &self.params).await;
        metrics::record_provider_latency(self.provider.name(), started.elapsed());

        let response = result?;
        tracing::debug!(
            provider = self.provider.name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = response.finish_reason.as_str(),
            "Provider responded"
        );

        Ok(response.text.filter(|text| !text.is_empty()))
    }

    fn describe_failure(&self, error: &ProviderError) -> String {
        if self.redact_errors {
            format!("Error: {}", REDACTED_ERROR)
        } else {
            format!("Error: {}", error)
        }
    }
}
