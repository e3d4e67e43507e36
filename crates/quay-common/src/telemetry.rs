//! Tracing initialization
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human readable or a JSON formatting layer.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,quay_workload=info,kube=warn";

/// Errors that can occur during telemetry initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The `RUST_LOG`-style directive could not be parsed
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        message: String,
    },

    /// Failed to initialize tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for telemetry initialization
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Emit JSON lines instead of human readable output
    pub json: bool,

    /// Explicit filter directive; falls back to `RUST_LOG`, then [`DEFAULT_FILTER`]
    pub filter: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: std::env::var("RUST_LOG").ok(),
        }
    }
}

impl TelemetryConfig {
    /// Build the `EnvFilter` this configuration describes
    pub fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        let directive = self.filter.as_deref().unwrap_or(DEFAULT_FILTER);
        EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
            filter: directive.to_string(),
            message: e.to_string(),
        })
    }
}

/// Initialize the global tracing subscriber.
///
/// Logs go to stderr so rendered manifests on stdout stay clean.
pub fn init_tracing(config: TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = config.env_filter()?;

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::SubscriberInit(e.to_string())
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        let config = TelemetryConfig {
            json: false,
            filter: None,
        };
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn explicit_filter_wins() {
        let config = TelemetryConfig {
            json: true,
            filter: Some("debug".to_string()),
        };
        let filter = config.env_filter().expect("debug is a valid directive");
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config = TelemetryConfig {
            json: false,
            filter: Some("quay=notalevel".to_string()),
        };
        let err = config.env_filter().expect_err("bad level should fail");
        assert!(err.to_string().contains("quay=notalevel"));
    }
}
