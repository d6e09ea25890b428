// src/common/stream.rs

//! Bounded blocking helpers on top of the non-blocking stream traits.
//!
//! Every helper takes a timeout and returns within it. A timeout is reported
//! as `None` (or a truncated line), never as a fabricated zero, so callers can
//! tell "the device said 0" apart from "the device said nothing".

use super::{
    error::Error,
    hal_traits::{SerialStream, Timer},
    timing,
};
use arrayvec::ArrayString;
use core::time::Duration;
use nb::Result as NbResult;

/// Longest numeric token `parse_next_float` accepts.
pub const MAX_NUMBER_LEN: usize = 24;

pub trait StreamExt: SerialStream + Timer + Sized {
    /// Repeats a non-blocking operation until it stops returning
    /// `WouldBlock` or the deadline passes. `Ok(None)` on deadline.
    fn poll_until<FN, T>(
        &mut self,
        deadline: Self::Instant,
        mut f: FN,
    ) -> Result<Option<T>, Error<Self::Error>>
    where
        FN: FnMut(&mut Self) -> NbResult<T, Self::Error>,
    {
        loop {
            match f(self) {
                Ok(result) => return Ok(Some(result)),
                Err(nb::Error::WouldBlock) => {
                    if self.now() >= deadline {
                        return Ok(None);
                    }
                    self.delay_us(timing::POLL_INTERVAL_US);
                }
                Err(nb::Error::Other(e)) => return Err(Error::Io(e)),
            }
        }
    }

    /// Executes a non-blocking I/O operation repeatedly until it stops
    /// returning `WouldBlock`, returning the final result or a timeout error.
    fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        f: FN,
    ) -> Result<T, Error<Self::Error>>
    where
        FN: FnMut(&mut Self) -> NbResult<T, Self::Error>,
    {
        let deadline = self.now() + timeout;
        self.poll_until(deadline, f)?.ok_or(Error::Timeout)
    }

    /// Writes every byte then flushes.
    fn write_all(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), Error<Self::Error>> {
        for byte in bytes {
            self.execute_blocking_io_with_timeout(timeout, |s| s.write_byte(*byte))?;
        }
        self.execute_blocking_io_with_timeout(timeout, |s| s.flush())
    }

    /// Discards everything currently buffered, once. Bytes arriving while
    /// this runs are left for the caller.
    fn clear_buffer(&mut self) -> Result<usize, Error<Self::Error>> {
        let backlog = self.available();
        let mut dropped = 0;
        for _ in 0..backlog {
            match self.read_byte() {
                Ok(_) => dropped += 1,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(Error::Io(e)),
            }
        }
        Ok(dropped)
    }

    /// Reads up to (and consumes, but does not return) `delimiter`.
    ///
    /// Stops early at the timeout and returns whatever arrived. Characters
    /// beyond the line capacity are dropped.
    fn read_line_until<const N: usize>(
        &mut self,
        delimiter: u8,
        timeout: Duration,
    ) -> Result<heapless::String<N>, Error<Self::Error>> {
        let deadline = self.now() + timeout;
        let mut line = heapless::String::new();
        while let Some(byte) = self.poll_until(deadline, |s| s.read_byte())? {
            if byte == delimiter {
                break;
            }
            // Full line: keep draining to the delimiter.
            let _ = line.push(char::from(byte));
        }
        Ok(line)
    }

    /// Skips bytes until one satisfying `starts` shows up, without consuming it.
    fn skip_until<F>(&mut self, deadline: Self::Instant, starts: F) -> Result<bool, Error<Self::Error>>
    where
        F: Fn(u8) -> bool,
    {
        while let Some(byte) = self.poll_until(deadline, |s| s.peek_byte())? {
            if starts(byte) {
                return Ok(true);
            }
            let _ = self.read_byte();
        }
        Ok(false)
    }

    /// Parses the next integer token, skipping any leading garbage.
    fn parse_next_int(&mut self, timeout: Duration) -> Result<Option<i32>, Error<Self::Error>> {
        let deadline = self.now() + timeout;
        if !self.skip_until(deadline, |b| b.is_ascii_digit() || b == b'-')? {
            return Ok(None);
        }

        let mut negative = false;
        let mut digits = 0usize;
        let mut value: i32 = 0;
        while let Some(byte) = self.poll_until(deadline, |s| s.peek_byte())? {
            match byte {
                b'-' if digits == 0 && !negative => negative = true,
                b'0'..=b'9' => {
                    value = value.saturating_mul(10).saturating_add(i32::from(byte - b'0'));
                    digits += 1;
                }
                _ => break,
            }
            let _ = self.read_byte();
        }

        if digits == 0 {
            return Ok(None);
        }
        Ok(Some(if negative { -value } else { value }))
    }

    /// Parses the next floating-point token (`-12.5`, `3`, `.25`), skipping
    /// any leading garbage including SDI-12 `+` signs.
    fn parse_next_float(&mut self, timeout: Duration) -> Result<Option<f32>, Error<Self::Error>> {
        let deadline = self.now() + timeout;
        if !self.skip_until(deadline, |b| b.is_ascii_digit() || b == b'-' || b == b'.')? {
            return Ok(None);
        }

        let mut token = ArrayString::<MAX_NUMBER_LEN>::new();
        let mut seen_point = false;
        while let Some(byte) = self.poll_until(deadline, |s| s.peek_byte())? {
            let accept = match byte {
                b'-' => token.is_empty(),
                b'.' if !seen_point => {
                    seen_point = true;
                    true
                }
                b'0'..=b'9' => true,
                _ => false,
            };
            if !accept {
                break;
            }
            token.try_push(char::from(byte)).map_err(|_| Error::<Self::Error>::BufferOverflow {
                needed: MAX_NUMBER_LEN + 1,
                got: MAX_NUMBER_LEN,
            })?;
            let _ = self.read_byte();
        }

        Ok(token.parse::<f32>().ok())
    }
}

impl<T> StreamExt for T where T: SerialStream + Timer {}
