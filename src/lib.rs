// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod common;
pub mod lifecycle;
pub mod recorder;

// Re-export key types for convenience
pub use common::{Error, Sdi12Addr, SENTINEL};
pub use lifecycle::{MeasurementCycle, Sensor, SensorStatus};
pub use recorder::{RangingSensor, Sdi12Sensor};
