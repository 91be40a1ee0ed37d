//! Subscriber setup for the engine's own diagnostics.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Output format of the engine's own diagnostics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable multi-line output.
    #[default]
    Pretty,
}

/// Install the process-wide `tracing` subscriber that receives the engine's
/// own warnings (failed sinks, failed rotations) on stderr.
///
/// `RUST_LOG` overrides `level` when set.
///
/// # Errors
/// Returns an error if the level is unknown or a subscriber is already installed
pub fn init_diagnostics(level: &str, format: DiagnosticsFormat) -> Result<()> {
    let default_level = parse_log_level(level)?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let layer = match format {
        DiagnosticsFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter)
            .boxed(),
        DiagnosticsFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}

/// Parse a diagnostics level name.
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" | "err" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid diagnostics level: {level}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("debug"), Ok(Level::DEBUG)));
        assert!(matches!(parse_log_level("info"), Ok(Level::INFO)));
        assert!(matches!(parse_log_level("WARN"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("err"), Ok(Level::ERROR)));
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_init_rejects_unknown_level() {
        assert!(init_diagnostics("loud", DiagnosticsFormat::Pretty).is_err());
    }
}
