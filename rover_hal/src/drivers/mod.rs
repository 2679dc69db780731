//! Driver implementations.
//!
//! - [`simulation`] - software collaborators for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the collaborator traits from `rover_common::hal::driver`
//! 3. Export it here

pub mod simulation;
