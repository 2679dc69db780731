//! TOML configuration loader with validation.
//!
//! Loads [`ControllerConfig`], validates parameter bounds and builds the
//! transition table: the built-in one, or the file named by
//! `line.table_path` (resolved relative to the config file).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rover_common::config::{ConfigError, ConfigLoader};
use rover_common::control_unit::config::ControllerConfig;
use tracing::info;

use crate::error::ControlError;
use crate::state::line::{TableSpec, TransitionTable};

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Validated configuration, ready for runtime use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ControllerConfig,
    pub table: Arc<TransitionTable>,
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ControlError> {
    let config = ControllerConfig::load(path)?;
    let base = path.parent().unwrap_or(Path::new("."));
    finish(config, Some(base))
}

/// Load configuration from TOML text (for testing).
///
/// A relative `line.table_path` is resolved against the working directory.
pub fn load_config_from_str(toml_text: &str) -> Result<LoadedConfig, ControlError> {
    let config = ControllerConfig::from_toml_str(toml_text)?;
    finish(config, None)
}

fn finish(config: ControllerConfig, base: Option<&Path>) -> Result<LoadedConfig, ControlError> {
    config.validate().map_err(ConfigError::ValidationError)?;

    let table = match &config.line.table_path {
        Some(p) => {
            let path = resolve(base, p);
            let spec = TableSpec::load(&path)?;
            let table = TransitionTable::from_spec(&spec)?;
            info!(path = %path.display(), states = table.len(), "custom transition table loaded");
            table
        }
        None => TransitionTable::canonical(),
    };

    Ok(LoadedConfig {
        config,
        table: Arc::new(table),
    })
}

fn resolve(base: Option<&Path>, p: &str) -> PathBuf {
    let path = Path::new(p);
    match base {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
