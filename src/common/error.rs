// src/common/error.rs

use embedded_hal::digital::ErrorKind as PinErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum Error<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// Operation timed out.
    #[error("Operation timed out")]
    Timeout,

    /// Provided address character is not a valid SDI-12 address.
    #[error("Invalid SDI-12 address character: '{0}'")]
    InvalidAddress(char),

    /// Buffer provided was too small.
    #[error("Buffer overflow: needed {needed}, got {got}")]
    BufferOverflow { needed: usize, got: usize },

    /// A power or trigger line could not be driven.
    #[error("Digital output error: {0:?}")]
    Pin(PinErrorKind),

    /// A command could not be formatted into its fixed buffer.
    #[error("Command formatting failed")]
    CommandFormat,

    /// The device never acknowledged within the retry budget.
    #[error("No response after {attempts} attempts")]
    NoResponse { attempts: u8 },

    /// A reply arrived but failed length or format checks.
    #[error("Malformed response")]
    MalformedResponse,

    /// Result retrieval was requested with no measurement in flight.
    #[error("Sensor is not currently measuring")]
    NotMeasuring,

    /// Wake was requested before the sensor was powered.
    #[error("Sensor is not powered")]
    NotPowered,

    /// Every attempt of the ranging loop returned a rejected value.
    #[error("No valid reading after {attempts} attempts")]
    NoValidReading { attempts: u8 },
}

impl<E: core::fmt::Debug> Error<E> {
    /// Wraps a digital-output failure.
    pub fn pin<P: embedded_hal::digital::Error>(e: P) -> Self {
        Error::Pin(e.kind())
    }
}
