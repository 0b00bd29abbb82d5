//! Logging configuration.

use serde::{Deserialize, Serialize};

use super::Settings;

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Read `LOG_LEVEL` and `LOG_FORMAT` from the settings map.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            level: settings
                .get_str("LOG_LEVEL")
                .unwrap_or_else(default_level),
            format: settings
                .get_str("LOG_FORMAT")
                .unwrap_or_else(default_format),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
