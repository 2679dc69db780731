//! Integration test: configuration files shipped with the crate.

use std::path::{Path, PathBuf};

use rover_common::config::ConfigError;
use rover_common::control_unit::config::ControllerConfig;
use rover_control_unit::config::{load_config, load_config_from_str};
use rover_control_unit::error::ControlError;
use rover_control_unit::state::line::{TableSpec, TransitionTable};
use tempfile::TempDir;

fn shipped(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config").join(name)
}

#[test]
fn shipped_config_matches_defaults() {
    let loaded = load_config(&shipped("rover.toml")).unwrap();
    assert_eq!(loaded.config, ControllerConfig::default());
    assert_eq!(*loaded.table, TransitionTable::canonical());
}

#[test]
fn shipped_table_file_is_the_builtin_table() {
    let spec = TableSpec::load(&shipped("line_table.toml")).unwrap();
    assert_eq!(TransitionTable::from_spec(&spec).unwrap(), TransitionTable::canonical());
    assert_eq!(TransitionTable::canonical().to_spec(), spec);
}

#[test]
fn config_can_point_at_table_by_absolute_path() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("rover.toml");
    std::fs::write(
        &cfg,
        format!("[line]\ntable_path = {:?}\n", shipped("line_table.toml").display().to_string()),
    )
    .unwrap();

    let loaded = load_config(&cfg).unwrap();
    assert_eq!(*loaded.table, TransitionTable::canonical());
}

#[test]
fn missing_table_file_is_reported() {
    let err = load_config_from_str("[line]\ntable_path = \"/nonexistent/table.toml\"\n").unwrap_err();
    assert!(matches!(err, ControlError::Config(ConfigError::FileNotFound(_))));
}

#[test]
fn out_of_range_sections_rejected() {
    for text in [
        "[filter]\nsmoothing = 0\n",
        "[filter]\nsample_rate_hz = 5\n",
        "[line]\nstraight_speed = 20000\n",
        "[proximity]\nobstacle_mm = 5\n",
        "[collision]\nrotation_deg = 360\n",
    ] {
        let err = load_config_from_str(text).unwrap_err();
        assert!(
            matches!(err, ControlError::Config(ConfigError::ValidationError(_))),
            "{text:?} gave {err}"
        );
    }
}
