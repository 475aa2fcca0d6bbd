//! Configuration loading from the process environment.

use chat_service::config::{ChatConfig, FormatterKind, ProviderKind};
use secrecy::ExposeSecret;
use serial_test::serial;

const KEYS: &[&str] = &[
    "ENVIRONMENT",
    "CHAT_PROVIDER",
    "GOOGLE_API_KEY",
    "GEMINI_MODEL",
    "GEMINI_API_BASE",
    "GEMINI_TIMEOUT_SECS",
    "CHAT_SYSTEM_PROMPT",
    "CHAT_TEMPERATURE",
    "CHAT_MAX_OUTPUT_TOKENS",
    "CHAT_FORMATTER",
    "CHAT_REDACT_ERRORS",
    "CHAT_ALLOWED_ORIGINS",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn dev_defaults_apply() {
    clear_env();
    std::env::set_var("GOOGLE_API_KEY", "dev-key");

    let config = ChatConfig::load().expect("Failed to load config");

    assert_eq!(config.provider, ProviderKind::Gemini);
    assert_eq!(config.google.api_key.expose_secret(), "dev-key");
    assert_eq!(config.google.model, "gemini-2.0-flash");
    assert_eq!(config.google.timeout_secs, 120);
    assert_eq!(config.chat.formatter, FormatterKind::Tidy);
    assert!(!config.chat.redact_errors);
    assert!(config.chat.allowed_origins.is_empty());
    assert_eq!(config.chat.system_prompt, None);

    clear_env();
}

#[test]
#[serial]
fn gemini_requires_api_key() {
    clear_env();

    assert!(ChatConfig::load().is_err());
}

#[test]
#[serial]
fn mock_provider_needs_no_api_key() {
    clear_env();
    std::env::set_var("CHAT_PROVIDER", "mock");

    let config = ChatConfig::load().expect("Failed to load config");
    assert_eq!(config.provider, ProviderKind::Mock);

    clear_env();
}

#[test]
#[serial]
fn overrides_are_parsed() {
    clear_env();
    std::env::set_var("GOOGLE_API_KEY", "k");
    std::env::set_var("GEMINI_TIMEOUT_SECS", "30");
    std::env::set_var("CHAT_TEMPERATURE", "0.4");
    std::env::set_var("CHAT_MAX_OUTPUT_TOKENS", "512");
    std::env::set_var("CHAT_FORMATTER", "passthrough");
    std::env::set_var("CHAT_REDACT_ERRORS", "true");
    std::env::set_var("CHAT_ALLOWED_ORIGINS", "http://localhost:5173,https://app.example");
    std::env::set_var("CHAT_SYSTEM_PROMPT", "Answer posture questions.");

    let config = ChatConfig::load().expect("Failed to load config");

    assert_eq!(config.google.timeout_secs, 30);
    assert_eq!(config.chat.temperature, Some(0.4));
    assert_eq!(config.chat.max_output_tokens, Some(512));
    assert_eq!(config.chat.formatter, FormatterKind::Passthrough);
    assert!(config.chat.redact_errors);
    assert_eq!(config.chat.allowed_origins.len(), 2);
    assert_eq!(
        config.chat.system_prompt.as_deref(),
        Some("Answer posture questions.")
    );

    clear_env();
}

#[test]
#[serial]
fn invalid_numbers_are_config_errors() {
    clear_env();
    std::env::set_var("GOOGLE_API_KEY", "k");
    std::env::set_var("GEMINI_TIMEOUT_SECS", "forever");

    let err = ChatConfig::load().unwrap_err();
    assert!(err.to_string().contains("GEMINI_TIMEOUT_SECS"));

    clear_env();
}

#[test]
#[serial]
fn production_requires_explicit_values() {
    clear_env();
    std::env::set_var("ENVIRONMENT", "prod");
    std::env::set_var("GOOGLE_API_KEY", "k");

    // CHAT_PROVIDER and friends have no implicit defaults in prod
    assert!(ChatConfig::load().is_err());

    clear_env();
}
