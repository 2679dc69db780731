//! Control unit error type.
//!
//! Line-follower and filter logic have no failure modes of their own; every
//! variant here comes from configuration, a collaborator, or the runtime.

use rover_common::config::ConfigError;
use rover_common::hal::driver::HalError;
use thiserror::Error;

use crate::pipeline::slot::SlotError;
use crate::state::line::TableError;

/// Errors surfaced by setup and the control loop.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("transition table: {0}")]
    Table(#[from] TableError),

    #[error("actuator: {0}")]
    Actuator(#[from] HalError),

    #[error("estimate pipeline: {0}")]
    Pipeline(#[from] SlotError),

    #[error("RT setup error: {0}")]
    RtSetup(String),

    #[error("failed to spawn {0} thread: {1}")]
    Spawn(&'static str, String),

    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}
