// src/common/address.rs

use super::error::Error;
use core::convert::TryFrom;
use core::fmt;

/// A single-character SDI-12 device address (`0-9`, `a-z`, `A-Z`).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Sdi12Addr(char);

impl Sdi12Addr {
    pub const DEFAULT_ADDRESS: Sdi12Addr = Sdi12Addr('0');

    /// Creates a new `Sdi12Addr` if the given character is a valid address.
    pub fn new(address_char: char) -> Result<Self, Error<()>> {
        if Self::is_valid_address_char(address_char) {
            Ok(Sdi12Addr(address_char))
        } else {
            Err(Error::InvalidAddress(address_char))
        }
    }

    /// Maps a numeric address `0..=9` to its digit character.
    pub fn from_index(index: u8) -> Result<Self, Error<()>> {
        if index <= 9 {
            Ok(Sdi12Addr((b'0' + index) as char))
        } else {
            // Out-of-range numbers are reported as the character they would
            // have produced, or '?' past the ASCII range.
            let c = index.checked_add(b'0').map(char::from).unwrap_or('?');
            Err(Error::InvalidAddress(c))
        }
    }

    #[inline]
    pub const fn as_char(&self) -> char {
        self.0
    }

    #[inline]
    pub const fn as_byte(&self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub const fn is_standard(&self) -> bool {
        matches!(self.0, '0'..='9')
    }

    #[inline]
    pub const fn is_extended(&self) -> bool {
        matches!(self.0, 'a'..='z' | 'A'..='Z')
    }

    #[inline]
    pub const fn is_valid_address_char(c: char) -> bool {
        matches!(c, '0'..='9' | 'a'..='z' | 'A'..='Z')
    }
}

impl Default for Sdi12Addr {
    fn default() -> Self {
        Self::DEFAULT_ADDRESS
    }
}

impl TryFrom<char> for Sdi12Addr {
    type Error = Error<()>;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<u8> for Sdi12Addr {
    type Error = Error<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}

/// Takes the first character of the string; the rest is ignored.
impl TryFrom<&str> for Sdi12Addr {
    type Error = Error<()>;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let first = value.chars().next().ok_or(Error::<()>::InvalidAddress(' '))?;
        Self::new(first)
    }
}

impl From<Sdi12Addr> for char {
    fn from(value: Sdi12Addr) -> Self {
        value.0
    }
}

impl fmt::Display for Sdi12Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
