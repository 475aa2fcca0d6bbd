//! Application startup and lifecycle management.
//!
//! This module wires the text provider, formatter and responder together and
//! serves the HTTP API (chat, health, readiness, metrics).

use crate::config::{ChatConfig, FormatterKind, ProviderKind};
use crate::handlers::{chat, health_check, metrics_endpoint, not_found, readiness_check};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::mock::MockTextProvider;
use crate::services::providers::{GenerationParams, TextProvider};
use crate::services::{ChatResponder, PassthroughFormatter, ResponseFormatter, TidyFormatter};
use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::security_headers::security_headers_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use service_core::observability::init_metrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ChatConfig,
    pub responder: ChatResponder,
}

/// Build the text provider selected by configuration.
pub fn build_provider(config: &ChatConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    let provider: Arc<dyn TextProvider> = match config.provider {
        ProviderKind::Gemini => {
            let gemini_config = GeminiConfig {
                api_key: config.google.api_key.clone(),
                model: config.google.model.clone(),
                base_url: config.google.api_base.clone(),
                timeout: Duration::from_secs(config.google.timeout_secs),
            };
            let provider = GeminiTextProvider::new(gemini_config).map_err(|e| {
                tracing::error!(error = %e, "Failed to initialize Gemini text provider");
                AppError::ConfigError(anyhow::anyhow!(e))
            })?;
            tracing::info!(
                model = %config.google.model,
                "Initialized Gemini text provider"
            );
            Arc::new(provider)
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock text provider - responses are not generated by a model");
            Arc::new(MockTextProvider::echo())
        }
    };

    Ok(provider)
}

/// Build the responder around the given provider, using the configured
/// formatter and generation parameters.
pub fn build_responder(config: &ChatConfig, provider: Arc<dyn TextProvider>) -> ChatResponder {
    let formatter: Arc<dyn ResponseFormatter> = match config.chat.formatter {
        FormatterKind::Tidy => Arc::new(TidyFormatter),
        FormatterKind::Passthrough => Arc::new(PassthroughFormatter),
    };

    let params = GenerationParams {
        system_instruction: config.chat.system_prompt.clone(),
        temperature: config.chat.temperature,
        max_tokens: config.chat.max_output_tokens,
    };

    ChatResponder::new(provider, formatter)
        .with_params(params)
        .with_redacted_errors(config.chat.redact_errors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build the HTTP router with all middleware applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .route_layer(from_fn(metrics_middleware))
        .fallback(not_found)
        .layer(cors_layer(&state.config.chat.allowed_origins))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost, so the trace span sees the request id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed text provider.
    pub async fn build_with_provider(
        config: ChatConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let responder = build_responder(&config, provider);
        let state = AppState {
            config: config.clone(),
            responder,
        };

        // Bind HTTP listener (port 0 = random port for testing)
        let http_addr = config.common.socket_addr()?;
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(http_port = http_port, "Chat service listener bound");

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
