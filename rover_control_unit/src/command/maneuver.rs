//! Fixed, timed maneuvers.
//!
//! A maneuver is a short list of `(command, duration)` steps executed to
//! completion. Recovery and avoidance are expressed this way; nothing
//! interrupts a maneuver once started.

use rover_common::motion::MotionCommand;

/// Longest maneuver: pause, move, pause, plus one spare.
pub const MAX_MANEUVER_STEPS: usize = 4;

/// One timed actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManeuverStep {
    pub command: MotionCommand,
    pub duration_ms: u32,
}

/// Fixed-capacity step list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Maneuver {
    steps: heapless::Vec<ManeuverStep, MAX_MANEUVER_STEPS>,
}

impl Maneuver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Zero-length steps are dropped.
    pub fn then(mut self, command: MotionCommand, duration_ms: u32) -> Self {
        if duration_ms > 0 {
            let pushed = self.steps.push(ManeuverStep {
                command,
                duration_ms,
            });
            debug_assert!(pushed.is_ok(), "maneuver longer than {MAX_MANEUVER_STEPS} steps");
        }
        self
    }

    #[inline]
    pub fn steps(&self) -> &[ManeuverStep] {
        &self.steps
    }

    pub fn total_ms(&self) -> u32 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_skips_zero_length_steps() {
        let m = Maneuver::new()
            .then(MotionCommand::STOP, 0)
            .then(MotionCommand::backward(1000), 500)
            .then(MotionCommand::pivot_left(1000), 400);
        assert_eq!(m.steps().len(), 2);
        assert_eq!(m.total_ms(), 900);
        assert_eq!(m.steps()[0].command, MotionCommand::backward(1000));
    }

    #[test]
    fn empty_maneuver() {
        assert!(Maneuver::new().is_empty());
        assert_eq!(Maneuver::new().total_ms(), 0);
    }
}
