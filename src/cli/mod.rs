//! Command-line interface for the `fanlog` binary.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::domain::models::EngineConfig;
use crate::infrastructure::config::ConfigLoader;

/// Command-line interface of the `fanlog` binary.
#[derive(Parser, Debug)]
#[command(name = "fanlog")]
#[command(about = "Structured JSON logging to a rolling file and auxiliary sinks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./fanlog.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit one record through the configured engine
    Emit(commands::emit::EmitArgs),

    /// Rotate the configured log file now
    Rotate(commands::rotate::RotateArgs),

    /// Print the effective configuration
    Config(commands::config::ConfigArgs),
}

/// Effective configuration: defaults, then the file, then `FANLOG_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Print a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
