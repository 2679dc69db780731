//! Simulated differential drive.

use std::collections::VecDeque;

use rover_common::consts::SPEED_MAX;
use rover_common::prelude::{HalError, MotionActuator, MotionCommand};
use tracing::trace;

/// Commands kept in the history by default.
const HISTORY_DEFAULT: usize = 1024;

/// Drive that validates and records every command it is given.
#[derive(Debug, Clone)]
pub struct SimMotors {
    max_speed: u16,
    current: MotionCommand,
    applied: u64,
    rejected: u64,
    history: VecDeque<MotionCommand>,
    history_limit: usize,
}

impl SimMotors {
    /// Drive accepting speeds up to [`SPEED_MAX`].
    pub fn new() -> Self {
        Self::with_limit(SPEED_MAX)
    }

    /// Drive accepting speeds up to `max_speed`.
    pub fn with_limit(max_speed: u16) -> Self {
        Self {
            max_speed,
            current: MotionCommand::STOP,
            applied: 0,
            rejected: 0,
            history: VecDeque::new(),
            history_limit: HISTORY_DEFAULT,
        }
    }

    /// Keep at most `limit` commands; older entries are dropped first.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Command currently in effect.
    pub const fn current(&self) -> MotionCommand {
        self.current
    }

    /// Accepted commands so far.
    pub const fn applied(&self) -> u64 {
        self.applied
    }

    /// Commands refused for exceeding the speed limit.
    pub const fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Most recent accepted commands, oldest first.
    pub fn history(&self) -> &VecDeque<MotionCommand> {
        &self.history
    }
}

impl Default for SimMotors {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionActuator for SimMotors {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn apply(&mut self, command: &MotionCommand) -> Result<(), HalError> {
        let speed = command.left_speed.max(command.right_speed);
        if speed > self.max_speed {
            self.rejected += 1;
            return Err(HalError::SpeedOutOfRange {
                speed,
                limit: self.max_speed,
            });
        }

        if *command != self.current {
            trace!(mode = ?command.mode, left = command.left_speed, right = command.right_speed, "motors");
        }
        self.current = *command;
        self.applied += 1;
        if self.history_limit > 0 {
            if self.history.len() == self.history_limit {
                self.history.pop_front();
            }
            self.history.push_back(*command);
        }
        Ok(())
    }
}
