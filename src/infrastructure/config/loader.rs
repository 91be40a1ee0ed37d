//! Layered configuration loading: defaults, YAML file, then environment.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::{EngineConfig, Level};

/// Default project-local configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "fanlog.yaml";

/// Prefix of environment overrides (`FANLOG_LEVEL`, `FANLOG_FILE__MAX_BACKUPS`, ...).
pub const ENV_PREFIX: &str = "FANLOG_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: debug, info, warn, err")]
    InvalidLogLevel(String),

    #[error("Log path cannot be empty unless file output is disabled")]
    EmptyPath,

    #[error("Invalid max_size_mb: {0}. Must be at least 1")]
    InvalidMaxSize(u64),

    #[error("Invalid transport_timeout_ms: {0}. Must be at least 1")]
    InvalidTransportTimeout(u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `fanlog.yaml` in the working directory (optional)
    /// 3. Environment variables (`FANLOG_*`, nested keys split on `__`)
    pub fn load() -> Result<EngineConfig> {
        Self::extract(Figment::new().merge(Yaml::file(DEFAULT_CONFIG_FILE)))
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<EngineConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Self::extract(Figment::new().merge(Yaml::file(path)))
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn extract(files: Figment) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(files)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
        if config.level.parse::<Level>().is_err() {
            return Err(ConfigError::InvalidLogLevel(config.level.clone()));
        }

        if !config.disable_file && config.path.trim().is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        if config.file.max_size_mb == 0 {
            return Err(ConfigError::InvalidMaxSize(config.file.max_size_mb));
        }

        if config.transport_timeout_ms == 0 {
            return Err(ConfigError::InvalidTransportTimeout(
                config.transport_timeout_ms,
            ));
        }

        Ok(())
    }
}
