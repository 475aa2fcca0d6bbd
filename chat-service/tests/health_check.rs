mod common;

use chat_service::services::providers::mock::MockTextProvider;
use chat_service::services::providers::ProviderError;
use common::{test_config, TestApp};
use std::sync::Arc;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn(test_config()).await;

    let response = app
        .client
        .get(format!("{}/health", app.http_address))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chat-service");
}

#[tokio::test]
async fn readiness_check_returns_ok_for_healthy_provider() {
    let app = TestApp::spawn(test_config()).await;

    let response = app
        .client
        .get(format!("{}/ready", app.http_address))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn readiness_check_fails_when_provider_is_down() {
    let provider = Arc::new(MockTextProvider::failing(ProviderError::NotConfigured(
        "no key".to_string(),
    )));
    let app = TestApp::spawn_with_provider(test_config(), provider).await;

    let response = app
        .client
        .get(format!("{}/ready", app.http_address))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Service unavailable");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn metrics_endpoint_exposes_chat_counters() {
    let app = TestApp::spawn(test_config()).await;

    app.client
        .post(format!("{}/chat", app.http_address))
        .json(&serde_json::json!({"message": "hi"}))
        .send()
        .await
        .expect("Failed to send request");

    let metrics = app
        .client
        .get(format!("{}/metrics", app.http_address))
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .unwrap();

    assert!(metrics.contains("chat_responses_total"));
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let app = TestApp::spawn(test_config()).await;

    let response = app
        .client
        .get(format!("{}/nope", app.http_address))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}
