// src/common/response/identification.rs

use super::error::ResponseParseError;
use heapless::String;

pub const VENDOR_LEN: usize = 8;
pub const MODEL_LEN: usize = 6;
pub const VERSION_LEN: usize = 3;
/// The standard allows up to 13 characters of optional serial/extra info.
pub const SERIAL_LEN: usize = 13;

/// Decoded reply to `aI!`:
/// `a` `ll` `cccccccc` `mmmmmm` `vvv` `xxx...` `<CR><LF>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentificationInfo {
    /// SDI-12 version digits, e.g. `13` for v1.3.
    pub sdi_version: u8,
    pub vendor: String<VENDOR_LEN>,
    pub model: String<MODEL_LEN>,
    pub firmware_version: String<VERSION_LEN>,
    pub serial_number: String<SERIAL_LEN>,
}

/// Fixed-width substring by character position, clamped to the reply length.
fn field(reply: &str, start: usize, end: Option<usize>) -> &str {
    let byte_at = |n: usize| reply.char_indices().nth(n).map_or(reply.len(), |(i, _)| i);
    let start = byte_at(start);
    let end = end.map_or(reply.len(), byte_at);
    reply.get(start..end).unwrap_or("")
}

fn to_fixed<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.trim().chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl IdentificationInfo {
    /// Parses a reply line (address included, line ending optional).
    ///
    /// Short replies fill what they can: only a reply under two characters
    /// is rejected.
    pub fn parse(reply: &str) -> Result<Self, ResponseParseError> {
        let reply = reply.trim();
        if reply.chars().nth(1).is_none() {
            return Err(ResponseParseError::TooShort);
        }

        let version = field(reply, 1, Some(3));
        Ok(IdentificationInfo {
            sdi_version: version.trim().parse::<u8>().unwrap_or(0),
            vendor: to_fixed(field(reply, 3, Some(11))),
            model: to_fixed(field(reply, 11, Some(17))),
            firmware_version: to_fixed(field(reply, 17, Some(20))),
            serial_number: to_fixed(field(reply, 20, None)),
        })
    }

    /// Version as a number, `13` -> `1.3`.
    pub fn sdi_version_f32(&self) -> f32 {
        f32::from(self.sdi_version) / 10.0
    }
}
