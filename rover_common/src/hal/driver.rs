//! Driver traits and error types.
//!
//! This module defines:
//! - `LineSensor` - raw reflectance bitmask read on request
//! - `ProximityAdc` - three-channel proximity conversion
//! - `BumpSensor` - active-low bump switch port
//! - `MotionActuator` - differential drive output
//! - `DelayClock` - blocking millisecond delay
//! - `HalError` - failures reported by any of the above
//!
//! Sensors are infallible by contract: a read always yields a value.
//! Only actuation can fail.

use thiserror::Error;

use crate::motion::MotionCommand;
use crate::sensor::{BumpMask, RawSample};

/// Error types for collaborator operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Driver initialization failed.
    #[error("initialization failed: {0}")]
    InitFailed(String),

    /// Speed outside what the driver can produce.
    #[error("speed {speed} exceeds driver limit {limit}")]
    SpeedOutOfRange { speed: u16, limit: u16 },
}

/// Line sensor read primitive.
///
/// Returns the raw reflectance bitmask; which bits carry the left and right
/// detectors is a configuration concern of the quantizer.
pub trait LineSensor: Send {
    fn read_line(&mut self) -> u8;
}

/// Proximity ADC, sampled once per acquisition tick.
///
/// # Timing
/// Called from the periodic acquisition thread; must not block.
pub trait ProximityAdc: Send {
    fn sample(&mut self) -> RawSample;
}

/// Bump switch port.
pub trait BumpSensor: Send {
    /// Current active-low switch state.
    fn read_bumpers(&mut self) -> BumpMask;
}

/// Differential drive actuator.
pub trait MotionActuator: Send {
    /// Returns the driver's identifier (e.g. "simulation").
    fn name(&self) -> &'static str;

    /// Apply a command; it stays in effect until the next call.
    fn apply(&mut self, command: &MotionCommand) -> Result<(), HalError>;
}

/// Blocking delay service.
pub trait DelayClock: Send {
    fn delay_ms(&mut self, ms: u32);
}

impl<T: DelayClock + ?Sized> DelayClock for Box<T> {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}

impl<T: MotionActuator + ?Sized> MotionActuator for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn apply(&mut self, command: &MotionCommand) -> Result<(), HalError> {
        (**self).apply(command)
    }
}

impl<T: LineSensor + ?Sized> LineSensor for Box<T> {
    fn read_line(&mut self) -> u8 {
        (**self).read_line()
    }
}

impl<T: ProximityAdc + ?Sized> ProximityAdc for Box<T> {
    fn sample(&mut self) -> RawSample {
        (**self).sample()
    }
}

impl<T: BumpSensor + ?Sized> BumpSensor for Box<T> {
    fn read_bumpers(&mut self) -> BumpMask {
        (**self).read_bumpers()
    }
}
