//! Rover Common Library
//!
//! Shared constants, configuration loading and collaborator interfaces for
//! all rover workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Numeric limits and defaults
//! - [`config`] - Configuration loading traits and types
//! - [`control_unit`] - Controller configuration sections
//! - [`motion`] - Motion commands understood by the actuator
//! - [`sensor`] - Raw and filtered sensor types
//! - [`hal`] - Traits implemented by hardware collaborators
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use rover_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod hal;
pub mod motion;
pub mod prelude;
pub mod sensor;
