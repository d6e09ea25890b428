// src/recorder/mod.rs

//! Drivers for the supported sensor families.

pub mod ranging;
pub mod sdi12;

pub use ranging::{RangeFilter, RangingConfig, RangingSensor, RetryBudget};
pub use sdi12::{Decagon5tm, GenericSdi12, Sdi12Config, Sdi12Device, Sdi12Sensor};
