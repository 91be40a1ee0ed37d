//! Logging infrastructure
//!
//! - Day-boundary rotation controller for the local file sink
//! - `tracing` subscriber setup for the engine's own diagnostics

pub mod diagnostics;
pub mod rotation;

pub use diagnostics::{init_diagnostics, DiagnosticsFormat};
pub use rotation::{RotationController, RotationState};
