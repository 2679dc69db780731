//! Per-cycle command source arbitration.
//!
//! Exactly one source drives the actuator each cycle:
//!
//! | priority | source        | condition                      |
//! |----------|---------------|--------------------------------|
//! | 1        | collision     | bump latch triggered           |
//! | 2        | proximity     | obstacle closer than threshold |
//! | 3        | line follower | otherwise                      |
//!
//! The losing sources are not consulted further; in particular the line
//! follower is not stepped on a cycle it does not own.

use rover_common::sensor::Contacts;

use crate::safety::collision::CollisionState;
use crate::safety::proximity::Obstacle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSource {
    Collision,
    Proximity,
    LineFollower,
}

impl CommandSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collision => "collision",
            Self::Proximity => "proximity",
            Self::LineFollower => "line",
        }
    }
}

/// What the cycle will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Recover(Contacts),
    Avoid(Obstacle),
    FollowLine,
}

impl Decision {
    pub const fn source(&self) -> CommandSource {
        match self {
            Self::Recover(_) => CommandSource::Collision,
            Self::Avoid(_) => CommandSource::Proximity,
            Self::FollowLine => CommandSource::LineFollower,
        }
    }
}

#[inline]
pub const fn arbitrate(collision: CollisionState, obstacle: Option<Obstacle>) -> Decision {
    match (collision, obstacle) {
        (CollisionState::Triggered(contacts), _) => Decision::Recover(contacts),
        (CollisionState::Clear, Some(obstacle)) => Decision::Avoid(obstacle),
        (CollisionState::Clear, None) => Decision::FollowLine,
    }
}
