//! Control unit shared definitions.
//!
//! Configuration sections consumed by `rover_control_unit`.

pub mod config;
