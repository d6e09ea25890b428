// src/recorder/sdi12/io_helpers.rs

use super::session::BusSession;
use crate::common::{
    command::Command,
    error::Error,
    hal_traits::{Sdi12Bus, Timer},
    stream::StreamExt,
    timing,
};
use core::time::Duration;
use log::debug;

/// Longest reply line kept; the rest of an overlong line is discarded.
pub(crate) const MAX_REPLY_LEN: usize = 96;

pub(crate) type ReplyLine = heapless::String<MAX_REPLY_LEN>;

impl<'a, IF> BusSession<'a, IF>
where
    IF: Sdi12Bus + Timer,
{
    /// Sends break, marking, and the command, then waits the command delay.
    pub(super) fn send_command(&mut self, command: &Command) -> Result<(), Error<IF::Error>> {
        let command_buffer = command.format_into::<IF::Error>()?;

        let break_timeout = timing::BREAK_DURATION_MIN + Duration::from_millis(5);
        self.bus
            .execute_blocking_io_with_timeout(break_timeout, |iface| iface.send_break())?;
        self.bus
            .delay_us(timing::POST_BREAK_MARKING_MIN.as_micros() as u32);

        let write_duration = timing::BYTE_DURATION * command_buffer.len() as u32;
        let write_timeout = write_duration + Duration::from_millis(20);
        self.bus.write_all(command_buffer.as_bytes(), write_timeout)?;
        debug!(">>> {}", command_buffer);

        self.bus.delay_ms(self.config.command_delay.as_millis() as u32);
        Ok(())
    }

    /// Reads one `\n`-terminated line and trims it. A silent sensor yields
    /// an empty line.
    pub(super) fn read_reply(&mut self) -> Result<ReplyLine, Error<IF::Error>> {
        let raw: ReplyLine = self.bus.read_line_until(b'\n', self.config.read_timeout)?;
        let mut reply = ReplyLine::new();
        // Cannot overflow: the trimmed line is no longer than the raw one.
        let _ = reply.push_str(raw.trim());
        debug!("<<< {}", reply);
        Ok(reply)
    }

    /// Command and single-line reply, with the leftovers discarded.
    pub(super) fn transact(&mut self, command: &Command) -> Result<ReplyLine, Error<IF::Error>> {
        self.send_command(command)?;
        let reply = self.read_reply()?;
        self.bus.clear_buffer()?;
        Ok(reply)
    }

    /// Waits until at least `min_data_bytes` are buffered or `data_wait`
    /// has passed, whichever is first. Returns the buffered count.
    pub(super) fn wait_for_data(&mut self) -> usize {
        let deadline = self.bus.now() + self.config.data_wait;
        while self.bus.available() < self.config.min_data_bytes && self.bus.now() < deadline {
            self.bus.delay_us(timing::POLL_INTERVAL_US);
        }
        self.bus.available()
    }
}
