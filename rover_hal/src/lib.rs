//! # Rover HAL Library
//!
//! Host implementations of the collaborator traits defined in
//! `rover_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`clock`] - wall-clock delay service
//! - [`drivers`] - driver implementations (simulation)

#![deny(missing_docs)]

pub mod clock;
pub mod drivers;

pub use crate::clock::SystemClock;
