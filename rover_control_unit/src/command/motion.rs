//! Output code → motion command mapping.
//!
//! The output code is the only channel from the line follower to the
//! actuator. Pivots run faster than straight travel.

use rover_common::control_unit::config::LineConfig;
use rover_common::motion::MotionCommand;

use crate::state::line::OutputCode;

/// Fixed speeds for the four output codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionMap {
    pub straight_speed: u16,
    pub pivot_speed: u16,
}

impl MotionMap {
    pub const fn from_config(config: &LineConfig) -> Self {
        Self {
            straight_speed: config.straight_speed,
            pivot_speed: config.pivot_speed,
        }
    }

    #[inline]
    pub const fn command(&self, output: OutputCode) -> MotionCommand {
        match output {
            OutputCode::Stop => MotionCommand::STOP,
            OutputCode::TurnLeft => MotionCommand::pivot_left(self.pivot_speed),
            OutputCode::TurnRight => MotionCommand::pivot_right(self.pivot_speed),
            OutputCode::Straight => MotionCommand::forward(self.straight_speed),
        }
    }
}

impl Default for MotionMap {
    fn default() -> Self {
        Self::from_config(&LineConfig::default())
    }
}
