//! Safety module root.
//!
//! Bump latching, collision recovery and proximity avoidance.

pub mod bump;
pub mod collision;
pub mod proximity;
