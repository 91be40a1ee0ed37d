//! CLI command implementations.

pub mod config;
pub mod emit;
pub mod rotate;
