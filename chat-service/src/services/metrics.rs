//! Chat-specific metrics, exported through the service-core Prometheus recorder.

use metrics::{counter, histogram};
use std::time::Duration;

/// How a chat request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Reply,
    Fallback,
    Error,
}

impl ChatOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatOutcome::Reply => "reply",
            ChatOutcome::Fallback => "fallback",
            ChatOutcome::Error => "error",
        }
    }
}

pub fn record_outcome(outcome: ChatOutcome) {
    counter!("chat_responses_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_provider_latency(provider: &'static str, elapsed: Duration) {
    histogram!("chat_provider_latency_seconds", "provider" => provider)
        .record(elapsed.as_secs_f64());
}

pub fn record_provider_error(provider: &'static str, error_type: &'static str) {
    counter!(
        "chat_provider_errors_total",
        "provider" => provider,
        "error_type" => error_type
    )
    .increment(1);
}
