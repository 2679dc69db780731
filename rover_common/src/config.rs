//! Configuration loading traits and types.
//!
//! Every rover binary reads one TOML file. Structs embed [`SharedConfig`]
//! under `[shared]` and load through the blanket [`ConfigLoader`] impl.
//!
//! ```rust,no_run
//! use rover_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct ToolConfig {
//!     shared: SharedConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ToolConfig::load(Path::new("rover.toml"))?;
//!     println!("service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading and validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at the given path.
    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File could not be read, or TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-sample detail.
    Trace,
    /// Per-cycle decisions.
    Debug,
    /// Startup, maneuvers and status summaries.
    #[default]
    Info,
    /// Stale samples and overruns.
    Warn,
    /// Fatal loop errors only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Fields shared by every rover service.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "rover-sim-01"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance identifier, shown in status logs.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "rover".to_string()
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
    /// Returns `ConfigError::ValidationError` if `service_name` is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loading of TOML configuration into any deserializable type.
///
/// - `ConfigError::FileNotFound` if the file does not exist
/// - `ConfigError::ParseError` if it cannot be read or is not valid TOML
///
/// Semantic validation is left to the caller.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::ParseError(format!("{}: {e}", path.display()))
            }
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse from TOML text.
    fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default)]
        shared: SharedConfig,
    }

    #[test]
    fn log_level_default_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::default().as_directive(), "info");
    }

    #[test]
    fn log_level_parses_lowercase() {
        let w = Wrapper::from_toml_str("[shared]\nlog_level = \"warn\"\n").unwrap();
        assert_eq!(w.shared.log_level, LogLevel::Warn);
        assert_eq!(w.shared.service_name, "rover");
    }

    #[test]
    fn missing_shared_section_uses_defaults() {
        let w = Wrapper::from_toml_str("").unwrap();
        assert_eq!(w.shared, SharedConfig::default());
        assert!(w.shared.validate().is_ok());
    }

    #[test]
    fn blank_service_name_rejected() {
        let shared = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "   ".to_string(),
        };
        assert!(matches!(
            shared.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[shared]\nservice_name = \"bench-rig\"\nlog_level = \"debug\"").unwrap();

        let w = Wrapper::load(file.path()).unwrap();
        assert_eq!(w.shared.service_name, "bench-rig");
        assert_eq!(w.shared.log_level, LogLevel::Debug);
    }

    #[test]
    fn load_missing_file() {
        let path = Path::new("/nonexistent/rover.toml");
        assert_eq!(
            Wrapper::load(path).unwrap_err(),
            ConfigError::FileNotFound(path.to_path_buf())
        );
    }

    #[test]
    fn load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[shared\nservice_name = ").unwrap();
        assert!(matches!(
            Wrapper::load(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
