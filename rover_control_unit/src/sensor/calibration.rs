//! IR distance calibration.
//!
//! ```text
//! d = A / (n + B) + C          (n >= ir_max)
//! d = max_distance_mm          (n <  ir_max, too far to resolve)
//! ```
//!
//! The result is clamped to `[0, max_distance_mm]`. With the default curve
//! the two branches meet at `n = ir_max` (800 mm).

use rover_common::control_unit::config::{CalibrationConfig, IrCurve};
use rover_common::sensor::{Channel, Distances, FilteredEstimate};

/// Convert one filtered ADC estimate to millimetres.
#[inline]
pub fn ir_distance(curve: &IrCurve, estimate: f64) -> u32 {
    let max = curve.max_distance_mm;
    if !estimate.is_finite() || estimate < curve.ir_max {
        return max;
    }
    let d = curve.a / (estimate + curve.b) + curve.c;
    if !d.is_finite() {
        return max;
    }
    d.clamp(0.0, f64::from(max)) as u32
}

/// Per-channel calibration for the three proximity sensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calibrator {
    curves: CalibrationConfig,
}

impl Calibrator {
    pub const fn new(curves: CalibrationConfig) -> Self {
        Self { curves }
    }

    #[inline]
    pub fn distance(&self, channel: Channel, estimate: f64) -> u32 {
        ir_distance(self.curves.curve(channel), estimate)
    }

    pub fn convert(&self, estimate: &FilteredEstimate) -> Distances {
        Distances {
            left_mm: self.distance(Channel::Left, estimate.left),
            center_mm: self.distance(Channel::Center, estimate.center),
            right_mm: self.distance(Channel::Right, estimate.right),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
