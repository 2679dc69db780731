//! Collaborator interfaces.
//!
//! The control unit only talks to hardware through the traits in
//! [`driver`]. `rover_hal` provides host implementations.

pub mod driver;
