// src/recorder/sdi12/protocol_helpers.rs

use super::session::BusSession;
use crate::common::{
    address::Sdi12Addr,
    command::Command,
    error::Error,
    hal_traits::{Sdi12Bus, Timer},
    response::{IdentificationInfo, MeasurementTiming},
    stream::StreamExt,
    types::{normalize_reading, SENTINEL},
};
use log::{debug, warn};

/// How an acknowledge reply relates to the expected address.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum AckMatch {
    Exact,
    /// Starts with the address but carries trailing characters.
    Prefixed,
    Missing,
}

pub(crate) fn classify_ack(reply: &str, address: Sdi12Addr) -> AckMatch {
    let mut chars = reply.chars();
    match chars.next() {
        Some(c) if c == address.as_char() => {
            if chars.as_str().is_empty() {
                AckMatch::Exact
            } else {
                AckMatch::Prefixed
            }
        }
        _ => AckMatch::Missing,
    }
}

impl<'a, IF> BusSession<'a, IF>
where
    IF: Sdi12Bus + Timer,
{
    /// Sends `a!` until the sensor answers or the attempts run out.
    pub(super) fn acknowledge(&mut self) -> Result<(), Error<IF::Error>> {
        let command = Command::AcknowledgeActive { address: self.address };
        let attempts = self.config.ack_attempts;

        for attempt in 1..=attempts {
            let reply = self.transact(&command)?;
            match classify_ack(&reply, self.address) {
                AckMatch::Exact => {
                    debug!("SDI12-{} replied as expected", self.address);
                    return Ok(());
                }
                AckMatch::Prefixed => {
                    warn!("SDI12-{} replied, unexpectedly: {}", self.address, reply);
                    return Ok(());
                }
                AckMatch::Missing => {
                    debug!("SDI12-{} did not reply (attempt {}/{})", self.address, attempt, attempts);
                }
            }
        }

        warn!("SDI12-{} did not acknowledge after {} attempts", self.address, attempts);
        Err(Error::NoResponse { attempts })
    }

    /// Acknowledge, then `aI!`.
    pub(super) fn identify(&mut self) -> Result<IdentificationInfo, Error<IF::Error>> {
        self.acknowledge()?;
        let reply = self.transact(&Command::SendIdentification { address: self.address })?;
        IdentificationInfo::parse(&reply).map_err(|e| {
            debug!("SDI12-{} identification reply unusable ({}): {}", self.address, e, reply);
            Error::MalformedResponse
        })
    }

    /// Acknowledge, then `aC!`. Any non-empty reply means the sensor
    /// started; the decoded timing is advisory.
    pub(super) fn start_concurrent(&mut self) -> Result<Option<MeasurementTiming>, Error<IF::Error>> {
        self.acknowledge()?;
        let reply = self.transact(&Command::StartConcurrentMeasurement { address: self.address })?;
        if reply.is_empty() {
            return Err(Error::NoResponse { attempts: 1 });
        }
        match MeasurementTiming::parse(&reply) {
            Ok(timing) => Ok(Some(timing)),
            Err(e) => {
                warn!("SDI12-{} sent an undecodable measurement reply ({}): {}", self.address, e, reply);
                Ok(None)
            }
        }
    }

    /// `aD0!`, then parses one value per slot of `out`. Slots the reply does
    /// not fill are left as the sentinel.
    pub(super) fn read_data(&mut self, out: &mut [f32]) -> Result<(), Error<IF::Error>> {
        out.iter_mut().for_each(|v| *v = SENTINEL);

        self.send_command(&Command::SendData { address: self.address, data_index: 0 })?;
        let buffered = self.wait_for_data();
        debug!("SDI12-{} has {} bytes of data waiting", self.address, buffered);

        // First byte is the address echo.
        if buffered > 0 {
            match self.bus.read_byte() {
                Ok(_) | Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(e)) => return Err(Error::Io(e)),
            }
        }
        let timeout = self.config.read_timeout;
        for slot in out.iter_mut() {
            *slot = match self.bus.parse_next_float(timeout)? {
                Some(value) => normalize_reading(value),
                None => SENTINEL,
            };
        }
        self.bus.clear_buffer()?;
        Ok(())
    }
}
