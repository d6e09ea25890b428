// src/recorder/sdi12/config.rs

use crate::common::timing;
use core::time::Duration;

/// Tunables for an SDI-12 sensor driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sdi12Config {
    /// Acknowledge attempts before the sensor is declared absent.
    pub ack_attempts: u8,
    /// Pause after every command before reading the reply.
    pub command_delay: Duration,
    /// Per-line read timeout.
    pub read_timeout: Duration,
    /// Upper bound on the wait for a data reply to start arriving.
    pub data_wait: Duration,
    /// Bytes that must be buffered before a data reply is parsed.
    pub min_data_bytes: usize,
    /// Data pin number, used only in the location string.
    pub data_pin: Option<u8>,
}

impl Sdi12Config {
    pub const fn new() -> Self {
        Sdi12Config {
            ack_attempts: 5,
            command_delay: timing::COMMAND_DELAY,
            read_timeout: timing::SDI12_READ_TIMEOUT,
            data_wait: timing::DATA_REPLY_WAIT_MAX,
            min_data_bytes: 3,
            data_pin: None,
        }
    }

    pub const fn with_data_pin(mut self, pin: u8) -> Self {
        self.data_pin = Some(pin);
        self
    }
}

impl Default for Sdi12Config {
    fn default() -> Self {
        Self::new()
    }
}
