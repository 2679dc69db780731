//! Collision arbitrator.
//!
//! Two states, derived from the bump latch:
//! - **Clear**: latch reads all clear, line following proceeds.
//! - **Triggered**: at least one switch latched; the cycle runs a recovery
//!   maneuver instead of the line follower, then clears the latch.
//!
//! Rotation policy, checked in this order:
//! 1. right-side switches (0, 1) → rotate left, -90°
//! 2. left-side switches (4, 5)  → rotate right, +90°
//! 3. anything else (middle)     → rotate left, -90°

use rover_common::control_unit::config::CollisionConfig;
use rover_common::motion::MotionCommand;
use rover_common::sensor::Contacts;

use super::bump::BumpLatch;
use crate::command::maneuver::Maneuver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionState {
    Clear,
    Triggered(Contacts),
}

/// Direction of the recovery rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Counter-clockwise, negative angle.
    Left,
    /// Clockwise, positive angle.
    Right,
}

impl Rotation {
    /// Signed angle for a rotation of `magnitude` degrees.
    pub const fn signed_degrees(self, magnitude: u16) -> i16 {
        match self {
            Self::Left => -(magnitude as i16),
            Self::Right => magnitude as i16,
        }
    }
}

/// Choose the rotation for a set of latched contacts.
pub const fn select_rotation(contacts: Contacts) -> Rotation {
    if contacts.intersects(Contacts::RIGHT_SIDE) {
        Rotation::Left
    } else if contacts.intersects(Contacts::LEFT_SIDE) {
        Rotation::Right
    } else {
        Rotation::Left
    }
}

/// Recovery chosen for one collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPlan {
    pub contacts: Contacts,
    pub rotation: Rotation,
    pub degrees: i16,
    pub maneuver: Maneuver,
}

/// Owns the reading half of the bump latch.
#[derive(Debug)]
pub struct CollisionArbitrator {
    latch: BumpLatch,
    config: CollisionConfig,
    handled: u64,
}

impl CollisionArbitrator {
    pub fn new(latch: BumpLatch, config: CollisionConfig) -> Self {
        Self {
            latch,
            config,
            handled: 0,
        }
    }

    /// Sample the latch once.
    #[inline]
    pub fn poll(&self) -> CollisionState {
        let mask = self.latch.load();
        if mask.is_clear() {
            CollisionState::Clear
        } else {
            CollisionState::Triggered(mask.contacts())
        }
    }

    /// Back up, rotate, settle.
    pub fn plan(&self, contacts: Contacts) -> RecoveryPlan {
        let c = &self.config;
        let rotation = select_rotation(contacts);
        let turn = match rotation {
            Rotation::Left => MotionCommand::pivot_left(c.turn_speed),
            Rotation::Right => MotionCommand::pivot_right(c.turn_speed),
        };
        RecoveryPlan {
            contacts,
            rotation,
            degrees: rotation.signed_degrees(c.rotation_deg),
            maneuver: Maneuver::new()
                .then(MotionCommand::backward(c.backup_speed), c.backup_ms)
                .then(turn, c.turn_ms)
                .then(MotionCommand::STOP, c.settle_ms),
        }
    }

    /// Recovery finished: reset the latch to all clear.
    pub fn complete(&mut self) {
        self.latch.clear();
        self.handled += 1;
    }

    /// Collisions handled since startup.
    pub const fn handled(&self) -> u64 {
        self.handled
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
