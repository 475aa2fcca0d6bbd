use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;
use service_core::observability::render_metrics;

/// Liveness endpoint for Docker/K8s.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "chat-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint: ready once the text provider answers its health check.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let provider = state.responder.provider();
    provider.health_check().await.map_err(|e| {
        tracing::warn!(provider = provider.name(), error = %e, "Readiness check failed");
        AppError::ServiceUnavailable
    })?;

    tracing::debug!(provider = provider.name(), "Readiness check passed");
    Ok(Json(json!({ "status": "ready", "provider": provider.name() })))
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        render_metrics(),
    )
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("No such endpoint"))
}
