//! Port trait definitions
//!
//! Interfaces the engine depends on, implemented by infrastructure adapters:
//! - Sink: destination for encoded records
//! - Publisher / QueueClient: transport connections owned by the host
//! - DayRotator / Clock: day-boundary rotation and time source
//! - Logger: emission interface for application code

pub mod logger;
pub mod rotation;
pub mod sink;
pub mod transport;

pub use logger::Logger;
pub use rotation::{Clock, DayRotator};
pub use sink::{SharedSink, Sink};
pub use transport::{Publisher, QueueClient};
