//! Structured Logging Configuration
//!
//! Two output modes:
//! - JSON for log aggregation (`LOG_FORMAT=json` or `format = "json"` in config)
//! - Human-readable text for development (default)
//!
//! The environment always wins over the options passed in, so an operator can
//! flip a running deployment to JSON or raise the level without touching the
//! config file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kr_common::logging::{init_logging, LoggingOptions};
//!
//! init_logging("kr-dev", &LoggingOptions::default());
//! tracing::info!(role_id = 7, "Role created");
//! ```
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: "json" or "text"
//! - `RUST_LOG`: standard filter directives, e.g. `RUST_LOG=kr_platform=debug`

use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to text for anything unrecognised.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Options used when no environment override is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    pub format: LogFormat,
    /// Default filter directive, e.g. "info" or "kr_platform=debug,info"
    pub level: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
        }
    }
}

/// Initialize the global subscriber for the given service.
///
/// Safe to call more than once: later calls are ignored, which keeps tests
/// that share a process from panicking.
pub fn init_logging(service_name: &str, options: &LoggingOptions) {
    let format = resolve_format(std::env::var("LOG_FORMAT").ok().as_deref(), options.format);
    let env_filter = build_filter(&options.level);

    let initialized = match format {
        LogFormat::Json => init_json_logging(env_filter),
        LogFormat::Text => init_text_logging(env_filter),
    };

    if initialized {
        tracing::debug!(service = service_name, ?format, "Logging initialized");
    }
}

fn resolve_format(env_value: Option<&str>, configured: LogFormat) -> LogFormat {
    match env_value {
        Some(v) if !v.is_empty() => LogFormat::parse(v),
        _ => configured,
    }
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_json_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init()
        .is_ok()
}

fn init_text_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }

    #[test]
    fn test_env_overrides_configured_format() {
        assert_eq!(resolve_format(Some("json"), LogFormat::Text), LogFormat::Json);
        assert_eq!(resolve_format(Some(""), LogFormat::Json), LogFormat::Json);
        assert_eq!(resolve_format(None, LogFormat::Json), LogFormat::Json);
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // Just verify a filter is always produced
        let filter = build_filter("not a [valid directive");
        drop(filter);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let options = LoggingOptions::default();
        init_logging("test", &options);
        init_logging("test", &options);
    }
}
