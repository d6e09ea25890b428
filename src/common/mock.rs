// src/common/mock.rs

//! Hardware stand-ins for unit tests. Time only moves when a delay or a
//! poll asks it to, so every timeout path is deterministic.

use super::hal_traits::{Sdi12Bus, SerialStream, Timer};
use core::convert::Infallible;
use core::time::Duration;
use nb::Result as NbResult;
use std::collections::{HashMap, VecDeque};

// --- Mock Instant ---
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockInstant(pub u64);

impl core::ops::Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl core::ops::Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

// --- Mock Comm Error ---
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockCommError;

// --- Mock Interface ---
pub struct MockInterface {
    current_time_us: u64,
    /// Bytes with the time (us) they become readable.
    incoming: VecDeque<(u64, u8)>,
    written: Vec<u8>,
    pending_command: String,
    commands: Vec<String>,
    /// Scripted replies, consumed in order per command.
    replies: Vec<(String, Vec<u8>)>,
    reply_delay_us: u64,
    active: bool,
    /// Makes the next `activate` fail.
    pub fail_activate: bool,
    /// Makes `read_byte` fail once when this byte is next in line.
    fail_read_on: Option<u8>,
    pub breaks_sent: u32,
    pub activations: u32,
    pub deactivations: u32,
    delays_ms: Vec<u32>,
    io_call_counts: HashMap<&'static str, u32>,
}

impl MockInterface {
    pub fn new() -> Self {
        MockInterface {
            current_time_us: 0,
            incoming: VecDeque::new(),
            written: Vec::new(),
            pending_command: String::new(),
            commands: Vec::new(),
            replies: Vec::new(),
            reply_delay_us: 10_000,
            active: false,
            fail_activate: false,
            fail_read_on: None,
            breaks_sent: 0,
            activations: 0,
            deactivations: 0,
            delays_ms: Vec::new(),
            io_call_counts: HashMap::new(),
        }
    }

    pub fn current_time_us(&self) -> u64 {
        self.current_time_us
    }

    pub fn advance_time(&mut self, us: u64) {
        self.current_time_us = self.current_time_us.saturating_add(us);
    }

    fn increment_call_count(&mut self, name: &'static str) {
        *self.io_call_counts.entry(name).or_insert(0) += 1;
    }

    pub fn call_count(&self, name: &'static str) -> u32 {
        *self.io_call_counts.get(name).unwrap_or(&0)
    }

    /// Makes bytes readable right now.
    pub fn stage_read_data(&mut self, data: &[u8]) {
        let now = self.current_time_us;
        self.stage_read_data_at(now, data);
    }

    /// Makes bytes readable from absolute time `at_us` onwards.
    pub fn stage_read_data_at(&mut self, at_us: u64, data: &[u8]) {
        self.incoming.extend(data.iter().map(|b| (at_us, *b)));
        self.incoming.make_contiguous().sort_by_key(|(t, _)| *t);
    }

    /// Queues `reply` to be sent the next time `command` is written.
    pub fn respond(&mut self, command: &str, reply: &[u8]) {
        self.replies.push((String::from(command), reply.to_vec()));
    }

    pub fn fail_read_on(&mut self, byte: u8) {
        self.fail_read_on = Some(byte);
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn command_count(&self, command: &str) -> usize {
        self.commands.iter().filter(|c| c.as_str() == command).count()
    }

    pub fn delays_ms(&self) -> &[u32] {
        &self.delays_ms
    }

    fn complete_command(&mut self) {
        let command = core::mem::take(&mut self.pending_command);
        if let Some(pos) = self.replies.iter().position(|(c, _)| *c == command) {
            let (_, reply) = self.replies.remove(pos);
            let at = self.current_time_us + self.reply_delay_us;
            self.stage_read_data_at(at, &reply);
        }
        self.commands.push(command);
    }

    fn ready(&self) -> Option<u8> {
        match self.incoming.front() {
            Some((t, b)) if *t <= self.current_time_us => Some(*b),
            _ => None,
        }
    }
}

impl Timer for MockInterface {
    type Instant = MockInstant;
    fn delay_us(&mut self, us: u32) {
        self.advance_time(us as u64);
    }
    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
        self.advance_time((ms as u64) * 1000);
    }
    fn now(&self) -> Self::Instant {
        MockInstant(self.current_time_us)
    }
}

impl SerialStream for MockInterface {
    type Error = MockCommError;

    fn read_byte(&mut self) -> NbResult<u8, Self::Error> {
        self.increment_call_count("read_byte");
        if self.fail_read_on.is_some() && self.ready() == self.fail_read_on {
            self.fail_read_on = None;
            return Err(nb::Error::Other(MockCommError));
        }
        match self.ready() {
            Some(byte) => {
                self.incoming.pop_front();
                Ok(byte)
            }
            None => Err(nb::Error::WouldBlock),
        }
    }

    fn peek_byte(&mut self) -> NbResult<u8, Self::Error> {
        self.ready().ok_or(nb::Error::WouldBlock)
    }

    fn write_byte(&mut self, byte: u8) -> NbResult<(), Self::Error> {
        self.increment_call_count("write_byte");
        self.written.push(byte);
        self.pending_command.push(char::from(byte));
        if byte == b'!' {
            self.complete_command();
        }
        Ok(())
    }

    fn flush(&mut self) -> NbResult<(), Self::Error> {
        self.increment_call_count("flush");
        Ok(())
    }

    fn available(&self) -> usize {
        self.incoming
            .iter()
            .take_while(|(t, _)| *t <= self.current_time_us)
            .count()
    }
}

impl Sdi12Bus for MockInterface {
    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self) -> Result<(), Self::Error> {
        if self.fail_activate {
            return Err(MockCommError);
        }
        self.activations += 1;
        self.active = true;
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), Self::Error> {
        self.deactivations += 1;
        self.active = false;
        Ok(())
    }

    fn send_break(&mut self) -> NbResult<(), Self::Error> {
        self.breaks_sent += 1;
        self.advance_time(12_000);
        Ok(())
    }
}

// --- Mock Pin ---
#[derive(Debug, Default)]
pub struct MockPin {
    pub high: bool,
    /// Every level written, in order.
    pub history: Vec<bool>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rising_edges(&self) -> usize {
        self.history.iter().filter(|level| **level).count()
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.history.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.history.push(true);
        Ok(())
    }
}
