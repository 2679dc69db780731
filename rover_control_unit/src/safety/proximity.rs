//! IR proximity obstacle avoidance.
//!
//! Ranks below collision recovery and above line following. Channels are
//! checked center, left, right; the first one closer than `obstacle_mm`
//! selects the maneuver.

use rover_common::control_unit::config::ProximityConfig;
use rover_common::motion::MotionCommand;
use rover_common::sensor::{Channel, Distances};

use crate::command::maneuver::Maneuver;

/// Side on which an obstacle was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub channel: Channel,
    pub distance_mm: u32,
}

#[derive(Debug, Clone)]
pub struct ProximityGuard {
    config: ProximityConfig,
}

impl ProximityGuard {
    pub const fn new(config: ProximityConfig) -> Self {
        Self { config }
    }

    pub fn detect(&self, distances: &Distances) -> Option<Obstacle> {
        if !self.config.enabled {
            return None;
        }
        [Channel::Center, Channel::Left, Channel::Right]
            .into_iter()
            .map(|channel| Obstacle {
                channel,
                distance_mm: distances.get(channel),
            })
            .find(|o| o.distance_mm < self.config.obstacle_mm)
    }

    /// Pause, move away from the obstacle, pause.
    pub fn maneuver(&self, obstacle: &Obstacle) -> Maneuver {
        let c = &self.config;
        let (command, ms) = match obstacle.channel {
            Channel::Center => (MotionCommand::backward(c.speed), c.backup_ms),
            Channel::Left => (MotionCommand::pivot_right(c.speed), c.turn_ms),
            Channel::Right => (MotionCommand::pivot_left(c.speed), c.turn_ms),
        };
        Maneuver::new()
            .then(MotionCommand::STOP, c.pause_ms)
            .then(command, ms)
            .then(MotionCommand::STOP, c.pause_ms)
    }
}
