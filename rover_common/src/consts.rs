//! System-wide constants for the rover workspace.
//!
//! Single source of truth for numeric limits and defaults. Config defaults
//! and `validate()` bounds are taken from here.

// ─── Topology ───────────────────────────────────────────────────────

/// Number of quantized line inputs (2-bit code).
pub const LINE_INPUT_COUNT: usize = 4;

/// Upper bound on states in a custom transition table.
pub const MAX_LINE_STATES: usize = 64;

/// Number of bump switches on the front panel.
pub const BUMP_SWITCH_COUNT: usize = 6;

/// Depth of the per-cycle diagnostic trace.
pub const TRACE_DEPTH: usize = 32;

// ─── Motion ─────────────────────────────────────────────────────────

/// Maximum wheel speed magnitude (PWM period in timer counts).
pub const SPEED_MAX: u16 = 14_998;

/// Straight-ahead speed used by the line follower.
pub const STRAIGHT_SPEED_DEFAULT: u16 = 500;

/// Pivot speed used by the line follower (faster than straight).
pub const PIVOT_SPEED_DEFAULT: u16 = 1000;

/// Dwell time of every non-terminal line-following state [ms].
pub const LINE_DWELL_MS: u32 = 500;

/// Poll period while parked in a terminal state [ms].
pub const TERMINAL_POLL_MS_DEFAULT: u32 = 10;
pub const TERMINAL_POLL_MS_MIN: u32 = 1;
pub const TERMINAL_POLL_MS_MAX: u32 = 1000;

/// Upper bound on any single dwell or maneuver step [ms].
pub const STEP_MS_MAX: u32 = 10_000;

/// Stop pause surrounding avoidance maneuvers [ms].
pub const STOP_PAUSE_MS_DEFAULT: u32 = 100;

// ─── Acquisition ────────────────────────────────────────────────────

/// Proximity sampling rate [Hz].
pub const SAMPLE_RATE_HZ_DEFAULT: u32 = 2000;
pub const SAMPLE_RATE_HZ_MIN: u32 = 10;
pub const SAMPLE_RATE_HZ_MAX: u32 = 20_000;

/// Exponential filter smoothing constant N.
pub const SMOOTHING_DEFAULT: u32 = 256;
pub const SMOOTHING_MIN: u32 = 1;
pub const SMOOTHING_MAX: u32 = 65_536;

/// Fresh publications consumed before each decision.
pub const SETTLE_SAMPLES_DEFAULT: u32 = 1;
pub const SETTLE_SAMPLES_MIN: u32 = 1;
pub const SETTLE_SAMPLES_MAX: u32 = 20_000;

/// Time without a fresh estimate before the loop gives up [ms].
pub const STALE_TIMEOUT_MS_DEFAULT: u32 = 100;
pub const STALE_TIMEOUT_MS_MIN: u32 = 1;
pub const STALE_TIMEOUT_MS_MAX: u32 = 10_000;

/// Bump switch polling rate [Hz].
pub const BUMP_POLL_HZ_DEFAULT: u32 = 1000;
pub const BUMP_POLL_HZ_MIN: u32 = 10;
pub const BUMP_POLL_HZ_MAX: u32 = 10_000;

// ─── Collision recovery ─────────────────────────────────────────────

pub const COLLISION_BACKUP_SPEED_DEFAULT: u16 = 1000;
pub const COLLISION_BACKUP_MS_DEFAULT: u32 = 500;
pub const COLLISION_TURN_SPEED_DEFAULT: u16 = 1000;
pub const COLLISION_TURN_MS_DEFAULT: u32 = 400;

/// Magnitude of the recovery rotation [deg].
pub const ROTATION_DEG_DEFAULT: u16 = 90;
pub const ROTATION_DEG_MAX: u16 = 180;

// ─── Proximity avoidance ────────────────────────────────────────────

/// Obstacle distance threshold [mm].
pub const OBSTACLE_MM_DEFAULT: u32 = 150;
pub const OBSTACLE_MM_MIN: u32 = 10;
pub const OBSTACLE_MM_MAX: u32 = 800;

pub const PROXIMITY_SPEED_DEFAULT: u16 = 1500;
pub const PROXIMITY_BACKUP_MS_DEFAULT: u32 = 500;
pub const PROXIMITY_TURN_MS_DEFAULT: u32 = 400;

// ─── IR calibration ─────────────────────────────────────────────────

/// Calibration numerator A in `d = A / (n + B) + C`.
pub const IR_A_DEFAULT: f64 = 1_195_172.0;
/// Calibration offset B.
pub const IR_B_DEFAULT: f64 = -1058.0;
/// Calibration offset C [mm].
pub const IR_C_DEFAULT: f64 = 0.0;
/// Readings below this ADC value are out of range.
pub const IR_MAX_DEFAULT: f64 = 2552.0;
/// Distance reported for out-of-range readings [mm].
pub const IR_MAX_DISTANCE_MM_DEFAULT: u32 = 800;

// ─── Diagnostics ────────────────────────────────────────────────────

/// Status summary interval [cycles].
pub const STATUS_INTERVAL_DEFAULT: u32 = 20;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/rover.toml";
