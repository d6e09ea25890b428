// src/recorder/sdi12/mod.rs

//! Driver for addressable SDI-12 sensors on a shared data line.

pub mod config;
pub mod devices;
mod io_helpers;
mod protocol_helpers;
mod session;

pub use config::Sdi12Config;
pub use devices::{Decagon5tm, GenericSdi12, Sdi12Device};

use self::session::BusSession;
use crate::common::{
    address::Sdi12Addr,
    error::Error,
    hal_traits::{Sdi12Bus, Timer},
    response::{IdentificationInfo, MeasurementTiming},
    types::{MAX_VARIABLES, SENTINEL},
};
use crate::lifecycle::{Location, Sensor, SensorCore};
use core::fmt::Write;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

/// One SDI-12 sensor at a fixed address.
///
/// Every exchange activates the line only for its own duration and leaves
/// it as it found it, so several drivers can share one line.
pub struct Sdi12Sensor<IF, P, D = GenericSdi12>
where
    IF: Sdi12Bus + Timer,
    P: OutputPin,
    D: Sdi12Device,
{
    interface: IF,
    power_pin: Option<P>,
    address: Sdi12Addr,
    config: Sdi12Config,
    device: D,
    core: SensorCore<IF::Instant>,
    identity: IdentificationInfo,
    last_timing: Option<MeasurementTiming>,
}

impl<IF, P, D> Sdi12Sensor<IF, P, D>
where
    IF: Sdi12Bus + Timer,
    P: OutputPin,
    D: Sdi12Device,
{
    pub fn new(interface: IF, address: Sdi12Addr, power_pin: Option<P>, device: D) -> Self {
        Self::with_config(interface, address, power_pin, device, Sdi12Config::default())
    }

    pub fn with_config(
        interface: IF,
        address: Sdi12Addr,
        power_pin: Option<P>,
        device: D,
        config: Sdi12Config,
    ) -> Self {
        let core = SensorCore::new(device.name(), device.num_variables(), device.timing());
        Sdi12Sensor {
            interface,
            power_pin,
            address,
            config,
            device,
            core,
            identity: IdentificationInfo::default(),
            last_timing: None,
        }
    }

    /// Number of cycles averaged into each result set.
    pub fn with_averaging(mut self, measurements: u8) -> Self {
        self.core = self.core.with_averaging(measurements);
        self
    }

    pub fn address(&self) -> Sdi12Addr {
        self.address
    }

    pub fn config(&self) -> &Sdi12Config {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn identity(&self) -> &IdentificationInfo {
        &self.identity
    }

    pub fn vendor(&self) -> &str {
        &self.identity.vendor
    }

    pub fn model(&self) -> &str {
        &self.identity.model
    }

    pub fn sensor_version(&self) -> &str {
        &self.identity.firmware_version
    }

    pub fn serial_number(&self) -> &str {
        &self.identity.serial_number
    }

    /// SDI-12 protocol version digits reported by the sensor, `13` for v1.3.
    pub fn sdi_version(&self) -> u8 {
        self.identity.sdi_version
    }

    /// Timing announced by the sensor for the most recent measurement.
    /// Advisory only; readiness is judged from the configured timing.
    pub fn last_measurement_timing(&self) -> Option<MeasurementTiming> {
        self.last_timing
    }

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    pub fn release(self) -> (IF, Option<P>) {
        (self.interface, self.power_pin)
    }

    fn session(&mut self) -> Result<BusSession<'_, IF>, Error<IF::Error>> {
        BusSession::open(&mut self.interface, self.address, &self.config)
    }

    /// Checks that the sensor answers its address.
    pub fn request_sensor_acknowledgement(&mut self) -> Result<(), Error<IF::Error>> {
        self.session()?.acknowledge()
    }

    /// Queries `aI!` and stores the decoded identity. A failed or too short
    /// reply leaves the previous identity untouched.
    pub fn get_sensor_info(&mut self) -> Result<(), Error<IF::Error>> {
        let info = self.session()?.identify();
        match info {
            Ok(info) => {
                info!(
                    "SDI12-{}: SDI-12 v{:.1}, vendor {}, model {}, version {}, serial {}",
                    self.address,
                    info.sdi_version_f32(),
                    info.vendor,
                    info.model,
                    info.firmware_version,
                    info.serial_number
                );
                self.identity = info;
                Ok(())
            }
            Err(e) => {
                warn!("SDI12-{}: no usable identification: {:?}", self.address, e);
                Err(e)
            }
        }
    }

    fn start_concurrent(&mut self) -> Result<Option<MeasurementTiming>, Error<IF::Error>> {
        self.session()?.start_concurrent()
    }

    fn read_data(&mut self, raw: &mut [f32]) -> Result<(), Error<IF::Error>> {
        self.session()?.read_data(raw)
    }
}

impl<IF, P, D> Sensor for Sdi12Sensor<IF, P, D>
where
    IF: Sdi12Bus + Timer,
    P: OutputPin,
    D: Sdi12Device,
{
    type Instant = IF::Instant;
    type Error = Error<IF::Error>;

    fn core(&self) -> &SensorCore<IF::Instant> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore<IF::Instant> {
        &mut self.core
    }

    fn now(&self) -> IF::Instant {
        self.interface.now()
    }

    fn location(&self) -> Location {
        let mut location = Location::new();
        let _ = write!(location, "SDI12-{}", self.address);
        if let Some(pin) = self.config.data_pin {
            let _ = write!(location, "_Pin{}", pin);
        }
        location
    }

    fn setup(&mut self) -> Result<(), Self::Error> {
        self.core.setup();
        let outcome = self.get_sensor_info();
        if outcome.is_err() {
            self.core.status_mut().set_error();
        }
        outcome
    }

    fn power_up(&mut self) -> Result<(), Self::Error> {
        let now = self.interface.now();
        self.core.power_up(self.power_pin.as_mut(), now)
    }

    fn wake(&mut self) -> Result<(), Self::Error> {
        let now = self.interface.now();
        self.core.wake(now)
    }

    fn start_single_measurement(&mut self) -> Result<(), Self::Error> {
        match self.start_concurrent() {
            Ok(timing) => {
                if let Some(timing) = timing {
                    let expected = self.device.num_returned();
                    if usize::from(timing.values_count) != expected {
                        warn!(
                            "SDI12-{} announced {} values, expected {}",
                            self.address, timing.values_count, expected
                        );
                    }
                    debug!(
                        "SDI12-{} results ready in {} s",
                        self.address, timing.time_seconds
                    );
                }
                self.last_timing = timing;
                let now = self.interface.now();
                self.core.mark_measurement_requested(Some(now));
                Ok(())
            }
            Err(e) => {
                warn!("SDI12-{} did not start a measurement: {:?}", self.address, e);
                self.last_timing = None;
                self.core.mark_measurement_requested(None);
                Err(e)
            }
        }
    }

    /// With a measurement in flight this always closes the cycle and returns
    /// `Ok`: a bus or reply failure is logged and leaves sentinels in the
    /// affected slots. Only a call with nothing in flight is an error.
    fn add_single_measurement_result(&mut self) -> Result<(), Self::Error> {
        if !self.core.measurement_in_flight() {
            debug!("SDI12-{} is not currently measuring", self.address);
            return Err(Error::NotMeasuring);
        }

        let returned = self.device.num_returned().min(MAX_VARIABLES);
        let variables = self.core.num_variables();
        let mut raw = [SENTINEL; MAX_VARIABLES];
        if let Err(e) = self.read_data(&mut raw[..returned]) {
            warn!("SDI12-{} data retrieval failed: {:?}", self.address, e);
            self.core.status_mut().set_error();
        }

        let mut processed = [SENTINEL; MAX_VARIABLES];
        self.device.process(&raw[..returned], &mut processed[..variables]);
        for (i, value) in processed[..variables].iter().enumerate() {
            self.core.verify_and_add_measurement_result(i, *value);
        }
        debug!("SDI12-{} results: {:?}", self.address, &processed[..variables]);

        self.core.complete_measurement();
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), Self::Error> {
        self.core.power_down(self.power_pin.as_mut())
    }
}
