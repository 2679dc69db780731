//! Sensor conditioning root.
//!
//! Line reflectance quantization and proximity distance calibration.

pub mod calibration;
pub mod quantizer;
