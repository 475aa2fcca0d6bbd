use crate::models::{ChatRequest, ChatResponse};
use crate::startup::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use service_core::error::AppError;

/// `POST /chat`: answer one message.
///
/// Generation failures and a non-string `message` are reported inside the
/// `response` text with a 200 status; only a body that is not a JSON object
/// is rejected.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected chat request body");
        AppError::from(rejection)
    })?;

    let request = ChatRequest::try_from(body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected chat request body");
        e
    })?;

    let response = state.responder.respond_to(&request).await;

    Ok(Json(response))
}
