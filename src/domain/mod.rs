//! Domain layer: records, levels, configuration, errors and port traits.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DispatchError, LogError, SinkError, SinkFailure};
