//! Log subscriber bootstrap
//!
//! The crate logs through `tracing`. Hosts without their own subscriber can
//! install a formatter here.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log levels accepted by [`LoggingConfig::validate`]
const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Settings for the log subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter, overridden by `RUST_LOG` (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON lines instead of human-readable text (default: false)
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Validate the settings
    ///
    /// # Errors
    ///
    /// Returns `LoggingError` if `log_level` is not one of
    /// trace, debug, info, warn or error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::LoggingError(format!(
                "log_level must be one of {:?}, got: '{}'",
                VALID_LEVELS, self.log_level
            )));
        }
        Ok(())
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.to_lowercase()))
    }
}

/// Install a global `tracing` subscriber
///
/// # Errors
///
/// Returns `LoggingError` if the settings are invalid or a global subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    config.validate()?;

    let builder = tracing_subscriber::fmt().with_env_filter(config.filter());
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.with_target(true).try_init()
    };

    result.map_err(|e| ConfigError::LoggingError(e.to_string()))
}
