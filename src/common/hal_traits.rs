// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A point on a monotonic clock.
pub trait Instant: Copy + Ord + Add<Duration, Output = Self> + Sub<Self, Output = Duration> {}

impl<T> Instant for T where T: Copy + Ord + Add<Duration, Output = T> + Sub<T, Output = Duration> {}

/// Abstraction for timer/delay operations.
pub trait Timer {
    type Instant: Instant;

    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Current monotonic time.
    fn now(&self) -> Self::Instant;
}

/// Abstraction for a buffered, non-blocking serial stream.
pub trait SerialStream {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to read a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if no byte is available yet.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Returns the next byte without consuming it.
    fn peek_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    /// Number of received bytes waiting in the input buffer.
    fn available(&self) -> usize;
}

/// A shared SDI-12 data line.
///
/// Several sensor objects may sit on hardware that only one of them can
/// drive at a time, so the line has to be explicitly activated before use.
pub trait Sdi12Bus: SerialStream {
    /// Whether this instance currently owns the line.
    fn is_active(&self) -> bool;

    /// Takes ownership of the line (timers, interrupts, UART).
    fn activate(&mut self) -> Result<(), Self::Error>;

    /// Releases the line.
    fn deactivate(&mut self) -> Result<(), Self::Error>;

    /// Sends the SDI-12 break condition (>= 12ms of spacing).
    fn send_break(&mut self) -> nb::Result<(), Self::Error>;
}
