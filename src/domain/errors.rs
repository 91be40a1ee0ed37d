//! Error types for the logging engine.
//!
//! Nothing here is ever fatal to a caller of the emission API: sink and
//! dispatch errors are reported through internal diagnostics, and only
//! construction-time failures reach the caller.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Engine-level errors (construction, configuration, rotation).
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log level: {0}. Must be one of: debug, info, warn, err")]
    InvalidLevel(String),

    #[error("Invalid log destination {}: {source}", path.display())]
    InvalidDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Rotation failed: {0}")]
    Rotation(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of a single sink write or sync.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Transport timed out after {0:?}")]
    Timeout(Duration),

    #[error("Write of {len} bytes exceeds maximum file size {max}")]
    Oversized { len: u64, max: u64 },

    #[error("Sink state poisoned: {0}")]
    Poisoned(String),
}

/// One failed sink inside a fan-out pass.
#[derive(Debug)]
pub struct SinkFailure {
    /// Position of the sink in the router (0 is the first registered sink).
    pub index: usize,
    /// What went wrong.
    pub error: SinkError,
}

/// Aggregate of every sink failure from one dispatch or sync pass.
#[derive(Debug, Error)]
#[error("{} of {total} sinks failed: {}", failures.len(), render_failures(failures))]
pub struct DispatchError {
    /// Number of sinks the buffer was sent to.
    pub total: usize,
    /// Failed sinks, in dispatch order.
    pub failures: Vec<SinkFailure>,
}

fn render_failures(failures: &[SinkFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("[{}] {}", f.index, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
