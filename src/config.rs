//! Configuration System
//!
//! Layered configuration for the snapshot CLI. Defaults are overridden by
//! an optional TOML file, which is overridden by `STATEVIEW_`-prefixed
//! environment variables (`STATEVIEW_LOGGING__LEVEL`, `STATEVIEW_OUTPUT__PRETTY`,
//! ...); command-line flags are applied last, by the binary.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "STATEVIEW";

/// Root configuration structure for the snapshot CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Document output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Document output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Indent the rendered document
    #[serde(default)]
    pub pretty: bool,
}

impl CliConfig {
    /// Load configuration, layering an optional file and environment
    /// overrides onto defaults
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
