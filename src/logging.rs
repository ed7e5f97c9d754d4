//! Logging System
//!
//! Structured logging via the `tracing` crate. Library code only emits
//! events; the binary initializes the subscriber here. Logs are written
//! to stderr so stdout stays a clean document stream.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable overriding the configured log filter
pub const LOG_ENV_VAR: &str = "STATEVIEW_LOG";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: text, json
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. The `STATEVIEW_LOG` environment variable
/// 2. The configured level
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let directives = match std::env::var(LOG_ENV_VAR) {
        Ok(env) => env,
        Err(_) => config.level.clone(),
    };
    let filter = EnvFilter::try_new(directives)
        .map_err(|e| ConfigError::Logging(format!("invalid log filter: {}", e)))?;

    let base_subscriber = Registry::default().with(filter);
    match config.format.as_str() {
        "json" => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        "text" => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        other => {
            return Err(ConfigError::Logging(format!(
                "unknown log format {:?} (expected \"text\" or \"json\")",
                other
            )))
        }
    }
    .map_err(|e| ConfigError::Logging(e.to_string()))
}
