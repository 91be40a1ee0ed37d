//! Implementation of the `fanlog config` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::EngineConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Effective configuration after every layer is merged.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    /// Merged configuration.
    pub config: EngineConfig,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config)
            .unwrap_or_else(|e| format!("Failed to render configuration: {e}"))
    }
}

/// Print the effective configuration.
pub async fn execute(_args: ConfigArgs, config: EngineConfig, json_mode: bool) -> Result<()> {
    output(&ConfigOutput { config }, json_mode);
    Ok(())
}
