//! Mock provider implementation for tests and local development.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// What the mock returns from `generate`.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Reply with `Mock response for: <prompt>`.
    Echo,
    /// Reply with a fixed text.
    Reply(String),
    /// Return a response without text.
    Empty,
    /// Fail with the given error.
    Fail(ProviderError),
}

/// Mock text provider for testing.
pub struct MockTextProvider {
    behavior: MockBehavior,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(MockBehavior::Fail(error))
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let text = match &self.behavior {
            MockBehavior::Echo => Some(format!("Mock response for: {}", prompt)),
            MockBehavior::Reply(text) => Some(text.clone()),
            MockBehavior::Empty => None,
            MockBehavior::Fail(error) => return Err(error.clone()),
        };

        Ok(ProviderResponse {
            output_tokens: text.as_ref().map(|t| t.len() as i32 / 4).unwrap_or(0),
            text,
            input_tokens: prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.behavior {
            MockBehavior::Fail(error) => Err(error.clone()),
            _ => Ok(()),
        }
    }
}
