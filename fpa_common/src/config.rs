//! Configuration loading traits and types.
//!
//! Every FPA front end reads its settings from a TOML file through the
//! [`ConfigLoader`] blanket trait. Application-specific structs embed
//! [`SharedConfig`] under a `[shared]` table.
//!
//! # Usage
//!
//! ```rust,no_run
//! use fpa_common::config::{ConfigLoader, SharedConfig, ConfigError};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct DriverConfig {
//!     shared: SharedConfig,
//!     root: String,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = DriverConfig::load(Path::new("fpa.toml"))?;
//!     println!("Analysing {} as {}", config.root, config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::consts::DEFAULT_SERVICE_NAME;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-path and per-query diagnostics.
    Trace,
    /// Construction events (paths populated, bindings synthesized).
    Debug,
    /// Run summaries.
    #[default]
    Info,
    /// Degraded input (unresolved names, skipped bindings).
    Warn,
    /// Fatal driver errors only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common configuration fields shared across FPA front ends.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "fpa-flight-control"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance identifier used in log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if the file cannot be read or the
///   TOML does not match the target type
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from an in-memory TOML document.
    fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Any serde-deserializable struct can be loaded.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn log_level_round_trips_through_toml() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Wrapper {
            level: LogLevel,
        }

        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            let text = toml::to_string(&Wrapper { level }).unwrap();
            assert!(text.contains(level.as_str()), "{text}");
        }

        let parsed: Wrapper = toml::from_str("level = \"warn\"").unwrap();
        assert_eq!(parsed.level, LogLevel::Warn);
    }

    #[test]
    fn shared_config_defaults() {
        let config = SharedConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shared_config_rejects_blank_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "   ".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn loader_reports_missing_file() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct TestConfig {
            value: String,
        }

        let result = TestConfig::load(Path::new("/nonexistent/fpa/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }

    #[test]
    fn loader_reports_parse_error() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct TestConfig {
            value: String,
        }

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = TestConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn loader_reads_shared_table() {
        #[derive(Debug, Deserialize)]
        struct TestConfig {
            shared: SharedConfig,
            root: String,
        }

        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"root = "top"

[shared]
log_level = "debug"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = TestConfig::load(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Debug);
        assert_eq!(config.shared.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(config.root, "top");
    }
}
