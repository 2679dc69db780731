//! State machine root.

pub mod line;
