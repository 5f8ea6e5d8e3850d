//! Structured logging setup using tracing.
//!
//! The provider process writes logs to stderr; stdout is reserved for the host
//! framework. `RUST_LOG` takes precedence over the configured filter.

use std::str::FromStr;

use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, for log aggregation.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn try_init_logging(filter: &str, format: LogFormat) -> Result<(), String> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| format!("Failed to create log filter: {e}"))?;

    let registry = tracing_subscriber::registry().with(filter_layer);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .flatten_event(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|e| format!("Failed to install subscriber: {e}"))?;

    tracing::info!(filter = %filter, ?format, "Logging initialized");
    Ok(())
}

/// Install the global tracing subscriber, exiting the process on failure.
pub fn init_logging(filter: &str, format: LogFormat) {
    if let Err(e) = try_init_logging(filter, format) {
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }
}

/// Initialize logging for tests (with simpler output). Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
