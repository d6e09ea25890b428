// src/common/response/error.rs

use core::fmt;

/// Error type specific to response parsing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResponseParseError {
    /// Response string is too short for the expected format.
    TooShort,
    /// Invalid address character at the start.
    InvalidAddressChar,
    /// Failed to parse numeric parts (e.g., ttt, nn, version).
    NumericError,
    /// Generic "invalid format" for cases not covered above.
    InvalidFormat,
}

impl From<core::num::ParseIntError> for ResponseParseError {
    fn from(_: core::num::ParseIntError) -> Self {
        ResponseParseError::NumericError
    }
}

impl fmt::Display for ResponseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ResponseParseError {}
