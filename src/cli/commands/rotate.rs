//! Implementation of the `fanlog rotate` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::EngineConfig;
use crate::infrastructure::sinks::RollingFile;

#[derive(Args, Debug)]
pub struct RotateArgs {}

/// Active path and the generations left after rotating.
#[derive(Debug, Serialize)]
pub struct RotateOutput {
    /// Path of the active log file.
    pub path: String,
    /// Generations on disk, newest first.
    pub generations: Vec<String>,
}

impl CommandOutput for RotateOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Rotated {}", self.path)];
        if !self.generations.is_empty() {
            lines.push("\nRotated generations (newest first):".to_string());
            for generation in &self.generations {
                lines.push(format!("  - {generation}"));
            }
        }
        lines.join("\n")
    }
}

/// Force a roll of the configured log file.
pub async fn execute(_args: RotateArgs, config: EngineConfig, json_mode: bool) -> Result<()> {
    if config.disable_file || config.is_stdout() {
        anyhow::bail!("No log file is configured (path: {})", config.path);
    }

    let path = config.path.clone();
    let policy = config.file;
    let generations = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
        let file = RollingFile::new(&path, policy)?;
        file.rotate_now()?;
        Ok(file
            .generations()
            .context("Failed to list rotated generations")?
            .into_iter()
            .map(|g| g.path.display().to_string())
            .collect())
    })
    .await
    .context("Rotation task failed")?
    .with_context(|| format!("Failed to rotate {}", config.path))?;

    output(
        &RotateOutput {
            path: config.path,
            generations,
        },
        json_mode,
    );
    Ok(())
}
