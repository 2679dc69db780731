//! Configuration structures for the control unit.
//!
//! All sections derive `serde::Deserialize` for TOML loading and default
//! every field, so an empty file is a valid configuration. Numeric bounds
//! live in [`crate::consts`] as `*_MIN`/`*_MAX` pairs.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::config::SharedConfig;
use crate::consts::*;
use crate::sensor::Channel;

fn check_range<T: PartialOrd + Display>(name: &str, value: T, min: T, max: T) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{name} {value} out of range [{min}, {max}]"));
    }
    Ok(())
}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level controller configuration. Immutable once the loop starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ControllerConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub collision: CollisionConfig,
    #[serde(default)]
    pub proximity: ProximityConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl ControllerConfig {
    /// Validate every section. The first failing section wins.
    pub fn validate(&self) -> Result<(), String> {
        self.shared.validate().map_err(|e| e.to_string())?;
        self.line.validate()?;
        self.filter.validate()?;
        self.collision.validate()?;
        self.proximity.validate()?;
        self.calibration.validate()?;
        self.diagnostics.validate()?;
        Ok(())
    }
}

// ─── Line Following ─────────────────────────────────────────────────

/// `[line]`: line follower speeds and sensor layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    /// Wheel speed for output code 3 (straight).
    #[serde(default = "default_straight_speed")]
    pub straight_speed: u16,

    /// Wheel speed for output codes 1 and 2 (pivot).
    #[serde(default = "default_pivot_speed")]
    pub pivot_speed: u16,

    /// Re-sample period while in a terminal state [ms].
    #[serde(default = "default_terminal_poll_ms")]
    pub terminal_poll_ms: u32,

    /// Bit of the raw line mask carrying the left detector.
    #[serde(default = "default_left_bit")]
    pub left_bit: u8,

    /// Bit of the raw line mask carrying the right detector.
    #[serde(default)]
    pub right_bit: u8,

    /// Optional TOML file replacing the built-in transition table.
    #[serde(default)]
    pub table_path: Option<String>,
}

fn default_straight_speed() -> u16 {
    STRAIGHT_SPEED_DEFAULT
}
fn default_pivot_speed() -> u16 {
    PIVOT_SPEED_DEFAULT
}
fn default_terminal_poll_ms() -> u32 {
    TERMINAL_POLL_MS_DEFAULT
}
fn default_left_bit() -> u8 {
    1
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            straight_speed: STRAIGHT_SPEED_DEFAULT,
            pivot_speed: PIVOT_SPEED_DEFAULT,
            terminal_poll_ms: TERMINAL_POLL_MS_DEFAULT,
            left_bit: default_left_bit(),
            right_bit: 0,
            table_path: None,
        }
    }
}

impl LineConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range("line.straight_speed", self.straight_speed, 1, SPEED_MAX)?;
        check_range("line.pivot_speed", self.pivot_speed, 1, SPEED_MAX)?;
        check_range(
            "line.terminal_poll_ms",
            self.terminal_poll_ms,
            TERMINAL_POLL_MS_MIN,
            TERMINAL_POLL_MS_MAX,
        )?;
        check_range("line.left_bit", self.left_bit, 0, 7)?;
        check_range("line.right_bit", self.right_bit, 0, 7)?;
        if self.left_bit == self.right_bit {
            return Err(format!(
                "line.left_bit and line.right_bit both map to bit {}",
                self.left_bit
            ));
        }
        Ok(())
    }
}

// ─── Acquisition Filter ─────────────────────────────────────────────

/// `[filter]`: proximity acquisition and smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Acquisition tick rate [Hz] (default: 2000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,

    /// Smoothing constant N of `e += (raw - e) / N` (default: 256).
    #[serde(default = "default_smoothing")]
    pub smoothing: u32,

    /// Fresh publications consumed before each decision (default: 1).
    #[serde(default = "default_settle_samples")]
    pub settle_samples: u32,

    /// Maximum wait for a fresh estimate [ms] (default: 100).
    #[serde(default = "default_stale_timeout")]
    pub stale_timeout_ms: u32,
}

fn default_sample_rate() -> u32 {
    SAMPLE_RATE_HZ_DEFAULT
}
fn default_smoothing() -> u32 {
    SMOOTHING_DEFAULT
}
fn default_settle_samples() -> u32 {
    SETTLE_SAMPLES_DEFAULT
}
fn default_stale_timeout() -> u32 {
    STALE_TIMEOUT_MS_DEFAULT
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: SAMPLE_RATE_HZ_DEFAULT,
            smoothing: SMOOTHING_DEFAULT,
            settle_samples: SETTLE_SAMPLES_DEFAULT,
            stale_timeout_ms: STALE_TIMEOUT_MS_DEFAULT,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range(
            "filter.sample_rate_hz",
            self.sample_rate_hz,
            SAMPLE_RATE_HZ_MIN,
            SAMPLE_RATE_HZ_MAX,
        )?;
        check_range("filter.smoothing", self.smoothing, SMOOTHING_MIN, SMOOTHING_MAX)?;
        check_range(
            "filter.settle_samples",
            self.settle_samples,
            SETTLE_SAMPLES_MIN,
            SETTLE_SAMPLES_MAX,
        )?;
        check_range(
            "filter.stale_timeout_ms",
            self.stale_timeout_ms,
            STALE_TIMEOUT_MS_MIN,
            STALE_TIMEOUT_MS_MAX,
        )?;
        // A timeout shorter than one tick can never be satisfied.
        let period_us = 1_000_000 / self.sample_rate_hz;
        if u64::from(self.stale_timeout_ms) * 1000 < u64::from(period_us) {
            return Err(format!(
                "filter.stale_timeout_ms {} shorter than one sample period ({period_us}µs)",
                self.stale_timeout_ms
            ));
        }
        Ok(())
    }

    /// Acquisition period [µs].
    #[inline]
    pub fn period_us(&self) -> u64 {
        1_000_000 / u64::from(self.sample_rate_hz.max(1))
    }
}

// ─── Collision Recovery ─────────────────────────────────────────────

/// `[collision]`: bump watcher and recovery maneuver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Bump port polling rate [Hz].
    #[serde(default = "default_bump_poll_hz")]
    pub poll_hz: u32,

    #[serde(default = "default_collision_backup_speed")]
    pub backup_speed: u16,

    #[serde(default = "default_collision_backup_ms")]
    pub backup_ms: u32,

    #[serde(default = "default_collision_turn_speed")]
    pub turn_speed: u16,

    /// Pivot time producing `rotation_deg` of rotation [ms].
    #[serde(default = "default_collision_turn_ms")]
    pub turn_ms: u32,

    /// Stop pause after the rotation [ms].
    #[serde(default = "default_stop_pause_ms")]
    pub settle_ms: u32,

    /// Rotation magnitude, reported in logs and traces [deg].
    #[serde(default = "default_rotation_deg")]
    pub rotation_deg: u16,
}

fn default_bump_poll_hz() -> u32 {
    BUMP_POLL_HZ_DEFAULT
}
fn default_collision_backup_speed() -> u16 {
    COLLISION_BACKUP_SPEED_DEFAULT
}
fn default_collision_backup_ms() -> u32 {
    COLLISION_BACKUP_MS_DEFAULT
}
fn default_collision_turn_speed() -> u16 {
    COLLISION_TURN_SPEED_DEFAULT
}
fn default_collision_turn_ms() -> u32 {
    COLLISION_TURN_MS_DEFAULT
}
fn default_stop_pause_ms() -> u32 {
    STOP_PAUSE_MS_DEFAULT
}
fn default_rotation_deg() -> u16 {
    ROTATION_DEG_DEFAULT
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            poll_hz: BUMP_POLL_HZ_DEFAULT,
            backup_speed: COLLISION_BACKUP_SPEED_DEFAULT,
            backup_ms: COLLISION_BACKUP_MS_DEFAULT,
            turn_speed: COLLISION_TURN_SPEED_DEFAULT,
            turn_ms: COLLISION_TURN_MS_DEFAULT,
            settle_ms: STOP_PAUSE_MS_DEFAULT,
            rotation_deg: ROTATION_DEG_DEFAULT,
        }
    }
}

impl CollisionConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range("collision.poll_hz", self.poll_hz, BUMP_POLL_HZ_MIN, BUMP_POLL_HZ_MAX)?;
        check_range("collision.backup_speed", self.backup_speed, 1, SPEED_MAX)?;
        check_range("collision.turn_speed", self.turn_speed, 1, SPEED_MAX)?;
        check_range("collision.backup_ms", self.backup_ms, 1, STEP_MS_MAX)?;
        check_range("collision.turn_ms", self.turn_ms, 1, STEP_MS_MAX)?;
        check_range("collision.settle_ms", self.settle_ms, 0, STEP_MS_MAX)?;
        check_range("collision.rotation_deg", self.rotation_deg, 1, ROTATION_DEG_MAX)?;
        Ok(())
    }
}

// ─── Proximity Avoidance ────────────────────────────────────────────

/// `[proximity]`: IR obstacle avoidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Distance below which a channel reports an obstacle [mm].
    #[serde(default = "default_obstacle_mm")]
    pub obstacle_mm: u32,

    #[serde(default = "default_proximity_speed")]
    pub speed: u16,

    #[serde(default = "default_proximity_backup_ms")]
    pub backup_ms: u32,

    #[serde(default = "default_proximity_turn_ms")]
    pub turn_ms: u32,

    /// Stop pause before and after each maneuver [ms].
    #[serde(default = "default_stop_pause_ms")]
    pub pause_ms: u32,
}

fn default_true() -> bool {
    true
}
fn default_obstacle_mm() -> u32 {
    OBSTACLE_MM_DEFAULT
}
fn default_proximity_speed() -> u16 {
    PROXIMITY_SPEED_DEFAULT
}
fn default_proximity_backup_ms() -> u32 {
    PROXIMITY_BACKUP_MS_DEFAULT
}
fn default_proximity_turn_ms() -> u32 {
    PROXIMITY_TURN_MS_DEFAULT
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            obstacle_mm: OBSTACLE_MM_DEFAULT,
            speed: PROXIMITY_SPEED_DEFAULT,
            backup_ms: PROXIMITY_BACKUP_MS_DEFAULT,
            turn_ms: PROXIMITY_TURN_MS_DEFAULT,
            pause_ms: STOP_PAUSE_MS_DEFAULT,
        }
    }
}

impl ProximityConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range(
            "proximity.obstacle_mm",
            self.obstacle_mm,
            OBSTACLE_MM_MIN,
            OBSTACLE_MM_MAX,
        )?;
        check_range("proximity.speed", self.speed, 1, SPEED_MAX)?;
        check_range("proximity.backup_ms", self.backup_ms, 1, STEP_MS_MAX)?;
        check_range("proximity.turn_ms", self.turn_ms, 1, STEP_MS_MAX)?;
        check_range("proximity.pause_ms", self.pause_ms, 0, STEP_MS_MAX)?;
        Ok(())
    }
}

// ─── IR Calibration ─────────────────────────────────────────────────

/// Calibration curve `d = a / (n + b) + c` for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrCurve {
    #[serde(default = "default_ir_a")]
    pub a: f64,
    #[serde(default = "default_ir_b")]
    pub b: f64,
    #[serde(default = "default_ir_c")]
    pub c: f64,
    /// Estimates below this are out of range and clamp to `max_distance_mm`.
    #[serde(default = "default_ir_max")]
    pub ir_max: f64,
    #[serde(default = "default_ir_max_distance")]
    pub max_distance_mm: u32,
}

fn default_ir_a() -> f64 {
    IR_A_DEFAULT
}
fn default_ir_b() -> f64 {
    IR_B_DEFAULT
}
fn default_ir_c() -> f64 {
    IR_C_DEFAULT
}
fn default_ir_max() -> f64 {
    IR_MAX_DEFAULT
}
fn default_ir_max_distance() -> u32 {
    IR_MAX_DISTANCE_MM_DEFAULT
}

impl Default for IrCurve {
    fn default() -> Self {
        Self {
            a: IR_A_DEFAULT,
            b: IR_B_DEFAULT,
            c: IR_C_DEFAULT,
            ir_max: IR_MAX_DEFAULT,
            max_distance_mm: IR_MAX_DISTANCE_MM_DEFAULT,
        }
    }
}

impl IrCurve {
    pub fn validate(&self, channel: Channel) -> Result<(), String> {
        let name = format!("{channel:?}").to_lowercase();
        if !(self.a.is_finite() && self.b.is_finite() && self.c.is_finite() && self.ir_max.is_finite()) {
            return Err(format!("calibration.{name}: coefficients must be finite"));
        }
        if self.a <= 0.0 {
            return Err(format!("calibration.{name}.a must be positive, got {}", self.a));
        }
        if self.ir_max + self.b <= 0.0 {
            return Err(format!(
                "calibration.{name}: ir_max + b must be positive ({} + {})",
                self.ir_max, self.b
            ));
        }
        if self.max_distance_mm == 0 {
            return Err(format!("calibration.{name}.max_distance_mm must be non-zero"));
        }
        Ok(())
    }
}

/// `[calibration.left|center|right]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub left: IrCurve,
    #[serde(default)]
    pub center: IrCurve,
    #[serde(default)]
    pub right: IrCurve,
}

impl CalibrationConfig {
    pub const fn curve(&self, channel: Channel) -> &IrCurve {
        match channel {
            Channel::Left => &self.left,
            Channel::Center => &self.center,
            Channel::Right => &self.right,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for channel in Channel::ALL {
            self.curve(channel).validate(channel)?;
        }
        Ok(())
    }
}

// ─── Diagnostics ────────────────────────────────────────────────────

/// `[diagnostics]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Status summary interval [cycles]; 0 disables the summary.
    #[serde(default = "default_status_interval")]
    pub status_interval: u32,
}

fn default_status_interval() -> u32 {
    STATUS_INTERVAL_DEFAULT
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            status_interval: STATUS_INTERVAL_DEFAULT,
        }
    }
}

impl DiagnosticsConfig {
    pub fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: ControllerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ControllerConfig::default());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.filter.sample_rate_hz, 2000);
        assert_eq!(cfg.filter.smoothing, 256);
        assert_eq!(cfg.filter.period_us(), 500);
        assert_eq!(cfg.line.straight_speed, 500);
        assert_eq!(cfg.line.pivot_speed, 1000);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: ControllerConfig = toml::from_str(
            r#"
            [filter]
            smoothing = 16

            [calibration.left]
            max_distance_mm = 600
            "#,
        )
        .unwrap();
        assert_eq!(cfg.filter.smoothing, 16);
        assert_eq!(cfg.filter.sample_rate_hz, SAMPLE_RATE_HZ_DEFAULT);
        assert_eq!(cfg.calibration.left.max_distance_mm, 600);
        assert_eq!(cfg.calibration.left.a, IR_A_DEFAULT);
        assert_eq!(cfg.calibration.right, IrCurve::default());
    }

    #[test]
    fn smoothing_zero_rejected() {
        let mut cfg = ControllerConfig::default();
        cfg.filter.smoothing = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("filter.smoothing"), "{err}");
    }

    #[test]
    fn stale_timeout_below_period_rejected() {
        let mut cfg = FilterConfig::default();
        cfg.sample_rate_hz = SAMPLE_RATE_HZ_MIN;
        cfg.stale_timeout_ms = 50;
        assert!(cfg.validate().is_err());
        cfg.stale_timeout_ms = 100;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn same_line_bits_rejected() {
        let cfg = LineConfig {
            left_bit: 3,
            right_bit: 3,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn speed_above_pwm_period_rejected() {
        let mut cfg = ControllerConfig::default();
        cfg.collision.turn_speed = SPEED_MAX + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn calibration_divisor_must_stay_positive() {
        let mut cfg = CalibrationConfig::default();
        cfg.center.ir_max = 1000.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("calibration.center"), "{err}");
    }

    #[test]
    fn proximity_can_be_disabled() {
        let cfg: ControllerConfig = toml::from_str("[proximity]\nenabled = false\n").unwrap();
        assert!(!cfg.proximity.enabled);
        assert_eq!(cfg.proximity.obstacle_mm, OBSTACLE_MM_DEFAULT);
    }
}
