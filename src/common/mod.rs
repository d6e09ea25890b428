// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod command;
pub mod error;
pub mod hal_traits;
pub mod response;
pub mod stream;
pub mod timing;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

// --- Re-export key types/traits/functions for easier access ---

pub use address::Sdi12Addr;
pub use command::Command;
pub use error::Error;
pub use hal_traits::{Instant, Sdi12Bus, SerialStream, Timer};
pub use response::{IdentificationInfo, MeasurementTiming, ResponseParseError};
pub use stream::StreamExt;
pub use types::{MAX_VARIABLES, SENTINEL};
