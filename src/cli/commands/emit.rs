//! Implementation of the `fanlog emit` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{EngineConfig, FieldValue, Fields, Level};
use crate::services::Engine;

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Record level (debug, info, warn, err)
    #[arg(short, long, default_value = "info")]
    pub level: String,

    /// Structured field as key=value (repeatable)
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Record message
    pub message: String,
}

/// Outcome of one `fanlog emit`.
#[derive(Debug, Serialize)]
pub struct EmitOutput {
    /// Whether the level passed the configured gate.
    pub emitted: bool,
    /// Level name as given.
    pub level: String,
    /// Primary destination path.
    pub destination: String,
    /// Number of sinks the record was routed to.
    pub sinks: usize,
}

impl CommandOutput for EmitOutput {
    fn to_human(&self) -> String {
        if self.emitted {
            format!("Emitted {} record to {}", self.level, self.destination)
        } else {
            format!(
                "Dropped {} record: below the configured level",
                self.level
            )
        }
    }
}

/// Emit one record through an engine built from `config`.
pub async fn execute(args: EmitArgs, config: EngineConfig, json_mode: bool) -> Result<()> {
    let level: Level = args.level.parse()?;
    let destination = config.path.clone();
    let engine = Engine::new(config).context("Failed to construct logging engine")?;

    let fields: Fields = args
        .fields
        .into_iter()
        .map(|(key, value)| (key, infer_value(&value)))
        .collect();

    let emitted = engine.enabled(level);
    engine.emit(level, &args.message, fields).await;
    engine.settle_rotation().await;
    engine.flush().await.context("Failed to flush log sinks")?;

    output(
        &EmitOutput {
            emitted,
            level: level.config_name().to_string(),
            destination,
            sinks: engine.sink_count(),
        },
        json_mode,
    );
    Ok(())
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

/// Numbers and booleans keep their JSON type; everything else is a string.
fn infer_value(raw: &str) -> FieldValue {
    if let Ok(v) = raw.parse::<i64>() {
        return FieldValue::Int(v);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return FieldValue::Uint(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        if v.is_finite() {
            return FieldValue::Float(v);
        }
    }
    match raw {
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        "null" => FieldValue::Null,
        _ => FieldValue::Str(raw.to_string()),
    }
}
