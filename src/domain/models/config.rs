//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pseudo-destination selecting standard output instead of a file.
pub const STDOUT_PATH: &str = "stdout";

/// Engine configuration, fixed for the lifetime of an engine.
///
/// Auxiliary sinks are handles and are attached through the engine builder,
/// not deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Minimum level name (debug, info, warn, err)
    #[serde(default = "default_level")]
    pub level: String,

    /// Log file path, or `stdout`
    #[serde(default = "default_path")]
    pub path: String,

    /// Value of the `service` key on every record
    #[serde(default)]
    pub service: String,

    /// Value of the `namespace` key on every record
    #[serde(default)]
    pub namespace: String,

    /// Skip local file output entirely (auxiliary sinks only)
    #[serde(default)]
    pub disable_file: bool,

    /// Rotate the file when the calendar day changes
    #[serde(default = "default_true")]
    pub daily_rotation: bool,

    /// Flush every sink after each emitted record
    #[serde(default = "default_true")]
    pub sync_on_emit: bool,

    /// Record the emitting call site
    #[serde(default = "default_true")]
    pub caller: bool,

    /// Upper bound for a single transport write, in milliseconds
    #[serde(default = "default_transport_timeout_ms")]
    pub transport_timeout_ms: u64,

    /// Size-based rolling policy of the local file
    #[serde(default)]
    pub file: RollingPolicy,
}

impl EngineConfig {
    /// Configuration writing to `path` at `level`, everything else default.
    pub fn new(path: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            level: level.into(),
            ..Self::default()
        }
    }

    /// Whether the destination is standard output.
    pub fn is_stdout(&self) -> bool {
        self.path == STDOUT_PATH
    }

    /// Bound on a single transport call.
    pub const fn transport_timeout(&self) -> Duration {
        Duration::from_millis(self.transport_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            path: default_path(),
            service: String::new(),
            namespace: String::new(),
            disable_file: false,
            daily_rotation: true,
            sync_on_emit: true,
            caller: true,
            transport_timeout_ms: default_transport_timeout_ms(),
            file: RollingPolicy::default(),
        }
    }
}

/// Size-triggered rolling and retention of the local log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RollingPolicy {
    /// Maximum size of one generation in megabytes
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Rotated generations to keep
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Compress rotated generations
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Name generations in local time instead of UTC
    #[serde(default = "default_true")]
    pub local_time: bool,
}

impl RollingPolicy {
    /// Size threshold in bytes.
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(MEGABYTE)
    }
}

impl Default for RollingPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
            max_backups: default_max_backups(),
            compress: true,
            local_time: true,
        }
    }
}

const MEGABYTE: u64 = 1024 * 1024;

fn default_level() -> String {
    "debug".to_string()
}

fn default_path() -> String {
    "/app/log/normal.log".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_transport_timeout_ms() -> u64 {
    2000
}

const fn default_max_size_mb() -> u64 {
    0x1000 * 5
}

const fn default_max_backups() -> usize {
    60
}
