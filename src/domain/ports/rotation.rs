//! Day-boundary rotation and clock ports.

use chrono::{DateTime, Local};

use crate::domain::errors::LogError;

/// Day-boundary rotation of a file destination (rename the active file, reopen
/// a fresh one). Called from the blocking pool, never from the emitting task.
pub trait DayRotator: Send + Sync {
    fn rotate(&self) -> Result<(), LogError>;
}

/// Source of "now" for timestamps and the day-boundary check.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}
