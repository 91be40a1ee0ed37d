//! Infrastructure layer module
//!
//! Adapters behind the domain ports:
//! - JSON line encoder
//! - Sinks (rolling file, stdout, pub/sub, work queue)
//! - Day-boundary rotation and diagnostics setup
//! - Configuration loading
//! - Clocks

pub mod clock;
pub mod config;
pub mod encoder;
pub mod logging;
pub mod sinks;
