use chat_service::config::ChatConfig;
use chat_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = ChatConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "chat-service",
        &config.observability.log_level,
        config.observability.otlp_endpoint.as_deref(),
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tracing::info!(port = app.http_port(), "Starting chat-service");

    app.run_until_stopped().await
}
