//! Command generation root.
//!
//! Output-code mapping, timed maneuvers, and per-cycle source arbitration
//! between collision recovery, proximity avoidance and line following.

pub mod arbitration;
pub mod maneuver;
pub mod motion;
