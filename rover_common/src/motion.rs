//! Motion commands accepted by the drive actuator.

use serde::{Deserialize, Serialize};

/// Drive mode of a differential-drive base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Both wheels forward.
    Forward,
    /// Both wheels backward.
    Backward,
    /// Left wheel backward, right wheel forward.
    PivotLeft,
    /// Left wheel forward, right wheel backward.
    PivotRight,
    /// Both wheels stopped.
    #[default]
    Stop,
}

impl MotionMode {
    /// Direction multiplier per wheel, `(left, right)`.
    pub const fn wheel_signs(self) -> (i8, i8) {
        match self {
            Self::Forward => (1, 1),
            Self::Backward => (-1, -1),
            Self::PivotLeft => (-1, 1),
            Self::PivotRight => (1, -1),
            Self::Stop => (0, 0),
        }
    }

    /// Mode with left and right exchanged.
    pub const fn mirrored(self) -> Self {
        match self {
            Self::PivotLeft => Self::PivotRight,
            Self::PivotRight => Self::PivotLeft,
            other => other,
        }
    }
}

/// A single actuation request: mode plus per-wheel speed magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct MotionCommand {
    pub mode: MotionMode,
    pub left_speed: u16,
    pub right_speed: u16,
}

impl MotionCommand {
    pub const STOP: Self = Self {
        mode: MotionMode::Stop,
        left_speed: 0,
        right_speed: 0,
    };

    pub const fn new(mode: MotionMode, left_speed: u16, right_speed: u16) -> Self {
        Self {
            mode,
            left_speed,
            right_speed,
        }
    }

    pub const fn forward(speed: u16) -> Self {
        Self::new(MotionMode::Forward, speed, speed)
    }

    pub const fn backward(speed: u16) -> Self {
        Self::new(MotionMode::Backward, speed, speed)
    }

    pub const fn pivot_left(speed: u16) -> Self {
        Self::new(MotionMode::PivotLeft, speed, speed)
    }

    pub const fn pivot_right(speed: u16) -> Self {
        Self::new(MotionMode::PivotRight, speed, speed)
    }

    /// Signed wheel speeds `(left, right)`; positive drives forward.
    pub const fn signed_speeds(&self) -> (i32, i32) {
        let (l, r) = self.mode.wheel_signs();
        (
            l as i32 * self.left_speed as i32,
            r as i32 * self.right_speed as i32,
        )
    }

    /// Command with left and right exchanged.
    pub const fn mirrored(&self) -> Self {
        Self {
            mode: self.mode.mirrored(),
            left_speed: self.right_speed,
            right_speed: self.left_speed,
        }
    }

    #[inline]
    pub const fn is_stop(&self) -> bool {
        matches!(self.mode, MotionMode::Stop)
    }
}
