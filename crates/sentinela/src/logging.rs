//! Tracing subscriber setup.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::loader::LOG_ENV;
use crate::config::{LogFormat, LoggingConfig};

const FALLBACK_DIRECTIVE: &str = "info";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("A global tracing subscriber is already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("A global `log` logger is already installed: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
}

/// Installs the global subscriber: an `EnvFilter`, one `fmt` layer writing to
/// stderr in the configured format, and the `log` bridge so records from
/// `log`-based dependencies reach the same output.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let directive = filter_directive(
        config,
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!(
            "invalid log filter '{}' ({}), falling back to '{}'",
            directive, e, FALLBACK_DIRECTIVE
        );
        EnvFilter::new(FALLBACK_DIRECTIVE)
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(false);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
    }

    tracing_log::LogTracer::init()?;

    tracing::debug!(filter = %directive, format = ?config.format, "tracing initialized");
    Ok(())
}

/// Picks the filter directive: `SENTINELA_LOG`, then `RUST_LOG`, then the
/// configured level.
pub fn filter_directive(
    config: &LoggingConfig,
    sentinela_log: Option<String>,
    rust_log: Option<String>,
) -> String {
    [sentinela_log, rust_log]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| config.level.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_level_is_default() {
        let config = LoggingConfig::default();
        assert_eq!(filter_directive(&config, None, None), "info");
    }

    #[test]
    fn test_sentinela_log_wins_over_rust_log() {
        let config = LoggingConfig::default();
        let directive = filter_directive(
            &config,
            Some("sentinela=trace".to_string()),
            Some("warn".to_string()),
        );
        assert_eq!(directive, "sentinela=trace");
    }

    #[test]
    fn test_rust_log_used_when_sentinela_log_blank() {
        let config = LoggingConfig::default();
        let directive = filter_directive(&config, Some("  ".to_string()), Some("debug".to_string()));
        assert_eq!(directive, "debug");
    }
}
