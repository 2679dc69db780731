//! Proximity filtering pipeline root.
//!
//! Acquisition thread → exponential filter → single-slot handoff to the
//! foreground loop.

pub mod acquisition;
pub mod filter;
pub mod slot;
