//! Prelude module for common re-exports.
//!
//! ```rust
//! use rover_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::control_unit::config::ControllerConfig;

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::hal::driver::{
    BumpSensor, DelayClock, HalError, LineSensor, MotionActuator, ProximityAdc,
};

// ─── Values ─────────────────────────────────────────────────────────
pub use crate::motion::{MotionCommand, MotionMode};
pub use crate::sensor::{BumpMask, Channel, Contacts, Distances, FilteredEstimate, RawSample};
