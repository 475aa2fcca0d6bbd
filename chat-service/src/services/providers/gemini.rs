//! Gemini AI provider implementation.
//!
//! Implements text generation using Google's Gemini `generateContent` API.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key, so it never appears in URLs or error messages.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    /// Build generation config from parameters.
    fn build_generation_config(&self, params: &GenerationParams) -> Option<GenerationConfig> {
        if params.temperature.is_none() && params.max_tokens.is_none() {
            return None;
        }

        Some(GenerationConfig {
            temperature: params.temperature,
            max_output_tokens: params.max_tokens,
        })
    }

    fn build_request(&self, prompt: &str, params: &GenerationParams) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            system_instruction: params.system_instruction.as_ref().map(|instruction| Content {
                role: None,
                parts: vec![ContentPart {
                    text: Some(instruction.clone()),
                }],
            }),
            generation_config: self.build_generation_config(params),
        }
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(prompt, params);
        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(describe_transport_error(&e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        parse_response(api_response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        // Fetching the model metadata verifies both the key and the model name
        let url = format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(describe_transport_error(&e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

/// Timeouts are reported as plain "timeout"; other transport errors keep reqwest's text.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_string()
    } else {
        err.to_string()
    }
}

fn parse_response(api_response: GenerateContentResponse) -> Result<ProviderResponse, ProviderError> {
    if api_response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_ref())
        .is_some()
    {
        return Err(ProviderError::ContentFiltered);
    }

    let candidate = api_response.candidates.first();

    let finish_reason = candidate
        .map(|c| match c.finish_reason.as_deref() {
            Some("STOP") | None => FinishReason::Complete,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
                FinishReason::ContentFilter
            }
            Some(_) => FinishReason::Error,
        })
        .unwrap_or(FinishReason::Complete);

    if finish_reason == FinishReason::ContentFilter {
        return Err(ProviderError::ContentFiltered);
    }

    // A candidate may split its answer across several text parts
    let text = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());

    let usage = api_response.usage_metadata.unwrap_or_default();

    Ok(ProviderResponse {
        text,
        input_tokens: usage.prompt_token_count.unwrap_or(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0),
        finish_reason,
    })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}
