// src/common/response/mod.rs

mod error;
mod identification;
mod timing;

// Re-export items for external use
pub use error::ResponseParseError;
pub use identification::{IdentificationInfo, MODEL_LEN, SERIAL_LEN, VENDOR_LEN, VERSION_LEN};
pub use timing::MeasurementTiming;
