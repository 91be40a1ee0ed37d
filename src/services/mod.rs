//! Service layer: the engine, its fan-out router and the process-wide default.

pub mod default_engine;
pub mod engine;
pub mod router;

pub use engine::{Engine, EngineBuilder};
pub use router::FanOut;
