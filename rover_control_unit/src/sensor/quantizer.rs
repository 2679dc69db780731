//! Line sensor quantizer.
//!
//! Collapses the raw reflectance mask into the 2-bit code the line FSM is
//! indexed by. Positive logic: a set detector bit means "over the line".
//!
//! | code | left | right | meaning              |
//! |------|------|-------|----------------------|
//! | 3    | 1    | 1     | centered on the line |
//! | 2    | 1    | 0     | drifted left of line |
//! | 1    | 0    | 1     | drifted right of line|
//! | 0    | 0    | 0     | line lost            |

use rover_common::control_unit::config::LineConfig;
use serde::{Deserialize, Serialize};

/// Quantized line reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LineInput {
    Lost = 0,
    DriftRight = 1,
    DriftLeft = 2,
    OnLine = 3,
}

impl LineInput {
    pub const ALL: [Self; 4] = [Self::Lost, Self::DriftRight, Self::DriftLeft, Self::OnLine];

    #[inline]
    pub const fn from_flags(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, true) => Self::OnLine,
            (true, false) => Self::DriftLeft,
            (false, true) => Self::DriftRight,
            (false, false) => Self::Lost,
        }
    }

    /// Decode a 2-bit code; higher bits are ignored.
    #[inline]
    pub const fn from_code(code: u8) -> Self {
        Self::from_flags(code & 0b10 != 0, code & 0b01 != 0)
    }

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Column in the transition table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Reading seen by a robot mirrored across the line.
    pub const fn mirrored(self) -> Self {
        match self {
            Self::DriftRight => Self::DriftLeft,
            Self::DriftLeft => Self::DriftRight,
            other => other,
        }
    }
}

/// Maps a raw reflectance mask onto [`LineInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineQuantizer {
    left_bit: u8,
    right_bit: u8,
}

impl LineQuantizer {
    /// Bit positions are taken modulo 8.
    pub const fn new(left_bit: u8, right_bit: u8) -> Self {
        Self {
            left_bit: left_bit & 7,
            right_bit: right_bit & 7,
        }
    }

    pub const fn from_config(config: &LineConfig) -> Self {
        Self::new(config.left_bit, config.right_bit)
    }

    /// Total: every mask yields a valid input.
    #[inline]
    pub const fn quantize(&self, raw: u8) -> LineInput {
        LineInput::from_flags(
            raw & (1 << self.left_bit) != 0,
            raw & (1 << self.right_bit) != 0,
        )
    }
}

impl Default for LineQuantizer {
    /// Two-detector layout: left on bit 1, right on bit 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
