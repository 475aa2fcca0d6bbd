use crate::services::providers::gemini::GEMINI_API_BASE;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub provider: ProviderKind,
    pub google: GoogleConfig,
    pub chat: ChatSettings,
    pub observability: ObservabilityConfig,
}

/// Which text generation backend answers chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "CHAT_PROVIDER must be 'gemini' or 'mock', got '{}'",
                other
            ))),
        }
    }
}

/// Post-processing applied to generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterKind {
    Tidy,
    Passthrough,
}

impl FromStr for FormatterKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tidy" => Ok(FormatterKind::Tidy),
            "passthrough" => Ok(FormatterKind::Passthrough),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "CHAT_FORMATTER must be 'tidy' or 'passthrough', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
    pub formatter: FormatterKind,
    /// Hide provider error details from clients (they are still logged).
    pub redact_errors: bool,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let provider: ProviderKind = get_env("CHAT_PROVIDER", Some("gemini"), is_prod)?.parse()?;

        // The mock backend needs no credentials
        let api_key = match provider {
            ProviderKind::Gemini => get_env("GOOGLE_API_KEY", None, is_prod)?,
            ProviderKind::Mock => env::var("GOOGLE_API_KEY").unwrap_or_default(),
        };

        Ok(ChatConfig {
            common: common_config,
            provider,
            google: GoogleConfig {
                api_key: Secret::new(api_key),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(GEMINI_API_BASE), is_prod)?,
                timeout_secs: parse_env(
                    "GEMINI_TIMEOUT_SECS",
                    &get_env(
                        "GEMINI_TIMEOUT_SECS",
                        Some(&DEFAULT_GEMINI_TIMEOUT_SECS.to_string()),
                        is_prod,
                    )?,
                )?,
            },
            chat: ChatSettings {
                system_prompt: get_optional_env("CHAT_SYSTEM_PROMPT"),
                temperature: get_optional_env("CHAT_TEMPERATURE")
                    .map(|v| parse_env("CHAT_TEMPERATURE", &v))
                    .transpose()?,
                max_output_tokens: get_optional_env("CHAT_MAX_OUTPUT_TOKENS")
                    .map(|v| parse_env("CHAT_MAX_OUTPUT_TOKENS", &v))
                    .transpose()?,
                formatter: get_env("CHAT_FORMATTER", Some("tidy"), is_prod)?.parse()?,
                redact_errors: parse_env(
                    "CHAT_REDACT_ERRORS",
                    &get_env("CHAT_REDACT_ERRORS", Some("false"), is_prod)?,
                )?,
                allowed_origins: get_optional_env("CHAT_ALLOWED_ORIGINS")
                    .map(|v| split_list(&v))
                    .unwrap_or_default(),
            },
            observability: ObservabilityConfig {
                log_level: get_optional_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Unset and blank values both count as absent.
fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, value, e))
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_case_insensitively() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(" mock ".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
        assert!("openai".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn formatter_kind_parses() {
        assert_eq!("tidy".parse::<FormatterKind>().unwrap(), FormatterKind::Tidy);
        assert_eq!(
            "PASSTHROUGH".parse::<FormatterKind>().unwrap(),
            FormatterKind::Passthrough
        );
        assert!("html".parse::<FormatterKind>().is_err());
    }

    #[test]
    fn parse_env_reports_key_on_failure() {
        let err = parse_env::<u64>("GEMINI_TIMEOUT_SECS", "soon").unwrap_err();
        assert!(err.to_string().contains("GEMINI_TIMEOUT_SECS"));
        assert!(parse_env::<bool>("CHAT_REDACT_ERRORS", " true ").unwrap());
    }

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(
            split_list("http://localhost:5173, ,https://posture.example "),
            vec![
                "http://localhost:5173".to_string(),
                "https://posture.example".to_string()
            ]
        );
    }
}
