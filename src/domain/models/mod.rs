//! Domain models: levels, records and engine configuration.

pub mod config;
pub mod level;
pub mod record;

pub use config::{EngineConfig, RollingPolicy, STDOUT_PATH};
pub use level::Level;
pub use record::{CallSite, FieldValue, Fields, Record, Values};
