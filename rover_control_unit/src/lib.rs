//! # Rover Control Unit Library
//!
//! Reactive motion controller for a differential-drive robot: a
//! table-driven line follower, preempted by proximity avoidance and, above
//! that, by bump-triggered collision recovery.
//!
//! ## Threads
//!
//! 1. **acquisition** - periodic proximity sampling and filtering
//! 2. **bump-watcher** - latches bump switch contacts
//! 3. **foreground** - [`cycle::ControlLoop`], the only actuator owner
//!
//! Threads communicate through two single-writer/single-reader handoffs:
//! the estimate slot ([`pipeline::slot`]) and the bump latch
//! ([`safety::bump`]). The transition table is immutable and shared.

pub mod command;
pub mod config;
pub mod cycle;
pub mod error;
pub mod pipeline;
pub mod rt;
pub mod safety;
pub mod sensor;
pub mod state;
