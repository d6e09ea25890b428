// src/common/response/timing.rs

use super::error::ResponseParseError;
use crate::common::address::Sdi12Addr;

/// Timing and count information returned by the concurrent measurement
/// command (`atttnn<CR><LF>`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MeasurementTiming {
    /// The address of the responding sensor.
    pub address: Sdi12Addr,
    /// Time estimate in seconds until data is ready (ttt). 0-999.
    pub time_seconds: u16,
    /// Number of measurement values that will be returned (nn). 0-99.
    pub values_count: u16,
}

impl MeasurementTiming {
    /// Parses a trimmed reply such as `"00102"` (address 0, 10 s, 2 values).
    /// A single-digit count (`atttn`, as sent by `aM!`) is accepted too.
    pub fn parse(reply: &str) -> Result<Self, ResponseParseError> {
        let bytes = reply.as_bytes();
        if bytes.len() < 5 {
            return Err(ResponseParseError::TooShort);
        }
        if bytes.len() > 7 {
            return Err(ResponseParseError::InvalidFormat);
        }
        let address =
            Sdi12Addr::new(char::from(bytes[0])).map_err(|_| ResponseParseError::InvalidAddressChar)?;
        if !bytes[1..].iter().all(u8::is_ascii_digit) {
            return Err(ResponseParseError::NumericError);
        }
        let time_seconds = reply[1..4].parse::<u16>()?;
        let values_count = reply[4..].parse::<u16>()?;
        Ok(MeasurementTiming { address, time_seconds, values_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_concurrent_reply() {
        let timing = MeasurementTiming::parse("00102").unwrap();
        assert_eq!(timing.address.as_char(), '0');
        assert_eq!(timing.time_seconds, 10);
        assert_eq!(timing.values_count, 2);
    }

    #[test]
    fn test_parse_single_digit_count() {
        let timing = MeasurementTiming::parse("a0013").unwrap();
        assert_eq!(timing.address.as_char(), 'a');
        assert_eq!(timing.time_seconds, 1);
        assert_eq!(timing.values_count, 3);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(MeasurementTiming::parse("0"), Err(ResponseParseError::TooShort));
        assert_eq!(MeasurementTiming::parse("00x02"), Err(ResponseParseError::NumericError));
        assert_eq!(MeasurementTiming::parse("?0102"), Err(ResponseParseError::InvalidAddressChar));
        assert_eq!(MeasurementTiming::parse("001020304"), Err(ResponseParseError::InvalidFormat));
    }
}
