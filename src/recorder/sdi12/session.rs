// src/recorder/sdi12/session.rs

use super::config::Sdi12Config;
use crate::common::{
    address::Sdi12Addr,
    error::Error,
    hal_traits::{Sdi12Bus, Timer},
    stream::StreamExt,
};
use log::{debug, warn};

/// Scoped use of a shared SDI-12 line.
///
/// Opening records whether the line was already active and activates it if
/// not. Dropping deactivates it again only in that case, so a caller that
/// held the line beforehand still holds it afterwards, whatever happened in
/// between.
pub(crate) struct BusSession<'a, IF>
where
    IF: Sdi12Bus + Timer,
{
    pub(super) bus: &'a mut IF,
    pub(super) address: Sdi12Addr,
    pub(super) config: &'a Sdi12Config,
    acquired: bool,
}

impl<'a, IF> BusSession<'a, IF>
where
    IF: Sdi12Bus + Timer,
{
    pub(crate) fn open(
        bus: &'a mut IF,
        address: Sdi12Addr,
        config: &'a Sdi12Config,
    ) -> Result<Self, Error<IF::Error>> {
        let was_active = bus.is_active();
        if was_active {
            debug!("SDI-12 line for {} was already active", address);
        } else {
            bus.activate().map_err(Error::Io)?;
        }
        let mut session = BusSession { bus, address, config, acquired: !was_active };
        session.bus.clear_buffer()?;
        Ok(session)
    }

    /// Whether this session activated the line itself.
    pub(crate) fn acquired(&self) -> bool {
        self.acquired
    }
}

impl<'a, IF> Drop for BusSession<'a, IF>
where
    IF: Sdi12Bus + Timer,
{
    fn drop(&mut self) {
        let _ = self.bus.clear_buffer();
        if self.acquired {
            if let Err(e) = self.bus.deactivate() {
                warn!("Failed to release SDI-12 line for {}: {:?}", self.address, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{hal_traits::SerialStream, mock::MockInterface};

    fn addr() -> Sdi12Addr {
        Sdi12Addr::new('0').unwrap()
    }

    #[test]
    fn test_inactive_line_is_released() {
        let mut mock = MockInterface::new();
        let config = Sdi12Config::default();
        {
            let session = BusSession::open(&mut mock, addr(), &config).unwrap();
            assert!(session.acquired());
            assert!(session.bus.is_active());
        }
        assert!(!mock.is_active());
        assert_eq!(mock.activations, 1);
        assert_eq!(mock.deactivations, 1);
    }

    #[test]
    fn test_active_line_stays_active() {
        let mut mock = MockInterface::new();
        mock.set_active(true);
        let config = Sdi12Config::default();
        {
            let session = BusSession::open(&mut mock, addr(), &config).unwrap();
            assert!(!session.acquired());
        }
        assert!(mock.is_active());
        assert_eq!(mock.activations, 0);
        assert_eq!(mock.deactivations, 0);
    }

    #[test]
    fn test_open_discards_stale_bytes() {
        let mut mock = MockInterface::new();
        mock.stage_read_data(b"junk\r\n");
        let config = Sdi12Config::default();
        let session = BusSession::open(&mut mock, addr(), &config).unwrap();
        assert_eq!(session.bus.available(), 0);
    }
}
