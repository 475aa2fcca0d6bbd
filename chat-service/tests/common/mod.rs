#![allow(dead_code)]

use chat_service::config::{
    ChatConfig, ChatSettings, FormatterKind, GoogleConfig, ObservabilityConfig, ProviderKind,
};
use chat_service::services::providers::TextProvider;
use chat_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config;
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub client: reqwest::Client,
}

/// Configuration with a random port and no external dependencies.
pub fn test_config() -> ChatConfig {
    ChatConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        provider: ProviderKind::Mock,
        google: GoogleConfig {
            api_key: Secret::new("test-api-key".to_string()),
            model: "gemini-2.0-flash".to_string(),
            api_base: "http://127.0.0.1:9/v1beta".to_string(),
            timeout_secs: 5,
        },
        chat: ChatSettings {
            system_prompt: None,
            temperature: None,
            max_output_tokens: None,
            formatter: FormatterKind::Passthrough,
            redact_errors: false,
            allowed_origins: Vec::new(),
        },
        observability: ObservabilityConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

impl TestApp {
    /// Spawn the application with the provider chosen by `config`.
    pub async fn spawn(config: ChatConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    /// Spawn the application around the given provider.
    pub async fn spawn_with_provider(config: ChatConfig, provider: Arc<dyn TextProvider>) -> Self {
        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    async fn run(app: Application) -> Self {
        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self {
            http_address,
            http_port,
            client,
        }
    }

    pub async fn post_chat(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/chat", self.http_address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
