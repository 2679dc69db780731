//! Wall-clock delay service.

use std::time::Duration;

use rover_common::hal::driver::DelayClock;

/// Blocks the calling thread for the requested time.
///
/// `time_scale` stretches or compresses every delay; `1.0` is real time,
/// `0.1` runs dwell times and maneuvers ten times faster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemClock {
    time_scale: f64,
}

impl SystemClock {
    /// Real-time clock.
    pub const fn new() -> Self {
        Self { time_scale: 1.0 }
    }

    /// Clock with every delay multiplied by `scale` (non-finite or negative
    /// values fall back to real time).
    pub fn with_time_scale(scale: f64) -> Self {
        let time_scale = if scale.is_finite() && scale >= 0.0 { scale } else { 1.0 };
        Self { time_scale }
    }

    /// Active scale factor.
    pub const fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Wall-clock duration of a `ms` delay.
    pub fn scaled(&self, ms: u32) -> Duration {
        Duration::from_micros((f64::from(ms) * 1000.0 * self.time_scale).round() as u64)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayClock for SystemClock {
    fn delay_ms(&mut self, ms: u32) {
        let d = self.scaled(ms);
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}
