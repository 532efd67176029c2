//! Settings of the confkit tooling itself

use filesystem::FileSystemOptions;
use serde::{Deserialize, Serialize};

/// Tool configuration, loaded from YAML and `CONFKIT_` environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP settings used for remote sources
    #[serde(default)]
    pub http: FileSystemOptions,
    /// List splitting defaults
    #[serde(default)]
    pub lists: ListConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// List splitting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Delimiter for multi-valued properties
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Trim whitespace around list elements
    #[serde(default = "default_true")]
    pub trim: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_delimiter() -> char {
    converter::LIST_DELIMITER
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            trim: default_true(),
        }
    }
}
