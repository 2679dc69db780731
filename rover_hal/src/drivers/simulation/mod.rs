//! Simulation drivers.
//!
//! Software stand-ins for every collaborator, so the control unit can run
//! without hardware:
//!
//! - [`ScriptedLine`] - replays a fixed sequence of line sensor readings
//! - [`SimProximity`] - noisy three-channel ADC with adjustable levels
//! - [`SimBumpers`] - bump panel with manual and scheduled presses
//! - [`SimMotors`] - records commands and enforces the speed limit

mod bump;
mod line;
mod motors;
mod proximity;

pub use bump::{BumpPanel, SimBumpers};
pub use line::ScriptedLine;
pub use motors::SimMotors;
pub use proximity::{ADC_MAX, ProximityLevels, SimProximity};
