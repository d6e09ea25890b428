// src/recorder/ranging/mod.rs

//! Driver for continuous-output serial ranging sensors (MaxBotix
//! HRXL-MaxSonar-WRL), optionally triggered.

pub mod config;

pub use config::{RangeFilter, RangingConfig};

use crate::common::{
    error::Error,
    hal_traits::{SerialStream, Timer},
    stream::StreamExt,
    types::SENTINEL,
};
use crate::lifecycle::{Location, Sensor, SensorCore, SensorTiming};
use core::fmt::Write;
use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

/// Longest banner line kept while discarding the power-on header.
const HEADER_LINE_LEN: usize = 64;

/// Attempts allowed and used by one retrieval.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RetryBudget {
    limit: u8,
    used: u8,
}

impl RetryBudget {
    pub const fn new(limit: u8) -> Self {
        RetryBudget { limit, used: 0 }
    }

    /// Takes one attempt if any are left.
    pub fn try_consume(&mut self) -> bool {
        if self.used < self.limit {
            self.used += 1;
            true
        } else {
            false
        }
    }

    pub fn used(&self) -> u8 {
        self.used
    }

    pub fn limit(&self) -> u8 {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

/// A sonar streaming `R<mm>\r` lines, read through a serial stream.
pub struct RangingSensor<IF, P, T>
where
    IF: SerialStream + Timer,
    P: OutputPin,
    T: OutputPin,
{
    interface: IF,
    power_pin: Option<P>,
    trigger_pin: Option<T>,
    config: RangingConfig,
    core: SensorCore<IF::Instant>,
    budget: RetryBudget,
}

impl<IF, P, T> RangingSensor<IF, P, T>
where
    IF: SerialStream + Timer,
    P: OutputPin,
    T: OutputPin,
{
    pub const NAME: &'static str = "MaxBotixMaxSonar";
    pub const NUM_VARIABLES: usize = 1;
    pub const RANGE_VAR: usize = 0;
    pub const TIMING: SensorTiming = SensorTiming::from_millis(160, 0, 166);

    pub fn new(interface: IF, power_pin: Option<P>, trigger_pin: Option<T>) -> Self {
        Self::with_config(interface, power_pin, trigger_pin, RangingConfig::default())
    }

    pub fn with_config(
        interface: IF,
        power_pin: Option<P>,
        trigger_pin: Option<T>,
        config: RangingConfig,
    ) -> Self {
        RangingSensor {
            interface,
            power_pin,
            trigger_pin,
            config,
            core: SensorCore::new(Self::NAME, Self::NUM_VARIABLES, Self::TIMING),
            budget: RetryBudget::new(config.max_attempts),
        }
    }

    pub fn with_averaging(mut self, measurements: u8) -> Self {
        self.core = self.core.with_averaging(measurements);
        self
    }

    pub fn config(&self) -> &RangingConfig {
        &self.config
    }

    /// Budget spent by the most recent retrieval.
    pub fn last_retry_budget(&self) -> RetryBudget {
        self.budget
    }

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    pub fn release(self) -> (IF, Option<P>, Option<T>) {
        (self.interface, self.power_pin, self.trigger_pin)
    }

    fn pulse_trigger(&mut self) -> Result<(), Error<IF::Error>> {
        if let Some(trigger) = self.trigger_pin.as_mut() {
            debug!("Triggering sonar with {:?} pulse", self.config.trigger_pulse);
            trigger.set_high().map_err(Error::<IF::Error>::pin)?;
            self.interface
                .delay_us(self.config.trigger_pulse.as_micros() as u32);
            trigger.set_low().map_err(Error::<IF::Error>::pin)?;
        }
        Ok(())
    }

    /// Triggers and parses until a reading passes the filter or the
    /// budget runs out.
    fn collect_range(&mut self) -> Result<i32, Error<IF::Error>> {
        let junk = self.interface.clear_buffer()?;
        if junk > 0 {
            debug!("Dumped {} characters from the sonar stream buffer", junk);
        }

        self.budget = RetryBudget::new(self.config.max_attempts);
        if !self.core.measurement_in_flight() {
            debug!("{} is not currently measuring", self.location());
            return Err(Error::NotMeasuring);
        }

        let filter = self.config.filter;
        while self.budget.try_consume() {
            self.pulse_trigger()?;
            let reading = self.interface.parse_next_int(self.config.read_timeout)?;
            // Trailing carriage return.
            match self.interface.read_byte() {
                Ok(_) | Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(e)) => return Err(Error::Io(e)),
            }

            match reading {
                Some(range) if filter.accepts(range) => {
                    debug!("Sonar range: {} mm after {} attempt(s)", range, self.budget.used());
                    return Ok(range);
                }
                other => {
                    debug!(
                        "Bad or suspicious sonar result {:?}, retry attempt #{}",
                        other,
                        self.budget.used()
                    );
                }
            }
        }

        Err(Error::NoValidReading { attempts: self.budget.used() })
    }
}

impl<IF, P, T> Sensor for RangingSensor<IF, P, T>
where
    IF: SerialStream + Timer,
    P: OutputPin,
    T: OutputPin,
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
        let _ = match (self.trigger_pin.is_some(), self.config.trigger_pin) {
            (true, Some(pin)) => write!(location, "sonarStream_trigger{}", pin),
            (true, None) => write!(location, "sonarStream_triggered"),
            (false, _) => write!(location, "sonarStream_untriggered"),
        };
        location
    }

    fn setup(&mut self) -> Result<(), Self::Error> {
        self.core.setup();
        if let Some(trigger) = self.trigger_pin.as_mut() {
            trigger.set_low().map_err(Error::<IF::Error>::pin)?;
        }
        Ok(())
    }

    fn power_up(&mut self) -> Result<(), Self::Error> {
        let now = self.interface.now();
        self.core.power_up(self.power_pin.as_mut(), now)
    }

    /// Discards the power-on banner, one line per configured header line.
    fn wake(&mut self) -> Result<(), Self::Error> {
        let now = self.interface.now();
        self.core.wake::<IF::Error>(now)?;

        let timeout = self.config.read_timeout;
        for i in 0..self.config.header_lines {
            let line: heapless::String<HEADER_LINE_LEN> = self.interface.read_line_until(b'\r', timeout)?;
            debug!("{} - {}", i, line.trim());
        }
        Ok(())
    }

    /// The sonar streams on its own; only the request time is recorded.
    fn start_single_measurement(&mut self) -> Result<(), Self::Error> {
        if !self.core.status().is_awake() {
            warn!("{} is not awake, cannot start a measurement", self.location());
            self.core.mark_measurement_requested(None);
            return Err(Error::NotPowered);
        }
        let now = self.interface.now();
        self.core.mark_measurement_requested(Some(now));
        Ok(())
    }

    /// Writes exactly one range (or the sentinel) and closes the cycle,
    /// whatever the outcome.
    fn add_single_measurement_result(&mut self) -> Result<(), Self::Error> {
        let outcome = self.collect_range();
        let range = match &outcome {
            Ok(range) => *range as f32,
            Err(e) => {
                if !matches!(e, Error::NotMeasuring) {
                    warn!("{}: no valid range: {:?}", self.location(), e);
                }
                SENTINEL
            }
        };
        self.core.verify_and_add_measurement_result(Self::RANGE_VAR, range);
        self.core.complete_measurement();
        info!("{} range: {}", self.location(), range);
        outcome.map(|_| ())
    }

    fn power_down(&mut self) -> Result<(), Self::Error> {
        self.core.power_down(self.power_pin.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::mock::{MockCommError, MockInterface, MockPin};
    use crate::lifecycle::{MeasurementCycle, NoPin, SensorStatus};

    type TestSonar = RangingSensor<MockInterface, MockPin, MockPin>;

    fn triggered() -> TestSonar {
        RangingSensor::with_config(
            MockInterface::new(),
            Some(MockPin::new()),
            Some(MockPin::new()),
            RangingConfig::default().with_trigger_pin(4),
        )
    }

    fn measuring(mut sonar: TestSonar) -> TestSonar {
        sonar.setup().unwrap();
        sonar.power_up().unwrap();
        sonar.interface_mut().advance_time(160_000);
        sonar.wake().unwrap();
        sonar.start_single_measurement().unwrap();
        sonar
    }

    #[test]
    fn test_retry_budget() {
        let mut budget = RetryBudget::new(2);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.used(), 2);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_location_strings() {
        assert_eq!(triggered().location().as_str(), "sonarStream_trigger4");
        let untriggered: RangingSensor<MockInterface, NoPin, NoPin> =
            RangingSensor::new(MockInterface::new(), None, None);
        assert_eq!(untriggered.location().as_str(), "sonarStream_untriggered");
    }

    #[test]
    fn test_wake_discards_header_lines() {
        let mut sonar = triggered();
        sonar.setup().unwrap();
        sonar.power_up().unwrap();
        sonar
            .interface_mut()
            .stage_read_data(b"HRXL-MaxSonar-WRL\rMB7389\rCopyright 2011\rMaxBotix\rPatent\rTempI\rR1234\r");
        sonar.wake().unwrap();
        assert!(sonar.status().is_awake());
        assert_eq!(sonar.interface().available(), 6);
    }

    #[test]
    fn test_wake_unpowered_fails() {
        let mut sonar = triggered();
        sonar.setup().unwrap();
        assert!(matches!(sonar.wake(), Err(Error::NotPowered)));
        assert!(!sonar.status().is_awake());
    }

    #[test]
    fn test_start_unpowered_stays_unpowered() {
        let mut sonar = triggered();
        sonar.setup().unwrap();

        assert!(matches!(sonar.start_single_measurement(), Err(Error::NotPowered)));
        let status = sonar.status();
        assert!(status.measurement_requested());
        assert!(!status.is_powered());
        assert!(!status.is_awake());
        assert_eq!(status.bits(), SensorStatus::BIT_SETUP | SensorStatus::BIT_REQUESTED);
        assert!(!sonar.power_pin.as_ref().unwrap().high);

        assert!(matches!(sonar.start_single_measurement(), Err(Error::NotPowered)));
        assert!(!sonar.status().is_powered());
        assert!(!sonar.core().measurement_in_flight());
    }

    #[test]
    fn test_stale_bytes_are_not_used() {
        let mut sonar = measuring(triggered());
        sonar.interface_mut().stage_read_data(b"R0712\r");
        assert!(sonar.add_single_measurement_result().is_err());
        assert_eq!(sonar.results(), &[SENTINEL]);
        assert_eq!(sonar.last_retry_budget().used(), 25);
    }

    #[test]
    fn test_skips_error_markers() {
        let mut sonar = measuring(triggered());
        let t = sonar.interface().current_time_us();
        sonar.interface_mut().stage_read_data_at(t + 1_000, b"R500\r");
        sonar.interface_mut().stage_read_data_at(t + 2_000, b"R9999\r");
        sonar.interface_mut().stage_read_data_at(t + 3_000, b"R712\r");

        sonar.add_single_measurement_result().unwrap();
        assert_eq!(sonar.results(), &[712.0]);
        assert_eq!(sonar.last_retry_budget().used(), 3);
        assert_eq!(sonar.trigger_pin.as_ref().unwrap().rising_edges(), 3);
        assert!(sonar.status().measurement_complete());
        assert!(!sonar.core().measurement_in_flight());
    }

    #[test]
    fn test_all_zero_readings_exhaust_budget() {
        let mut sonar = measuring(triggered());
        let t = sonar.interface().current_time_us();
        for i in 0..25u64 {
            sonar.interface_mut().stage_read_data_at(t + 1_000 * (i + 1), b"R0\r");
        }

        let err = sonar.add_single_measurement_result().unwrap_err();
        assert!(matches!(err, Error::NoValidReading { attempts: 25 }));
        assert_eq!(sonar.results(), &[SENTINEL]);
        assert_eq!(sonar.last_retry_budget().used(), 25);
        assert_eq!(sonar.trigger_pin.as_ref().unwrap().rising_edges(), 25);
        assert!(sonar.status().measurement_complete());
    }

    #[test]
    fn test_read_failure_after_reading_is_reported() {
        let mut sonar = measuring(triggered());
        let t = sonar.interface().current_time_us();
        sonar.interface_mut().stage_read_data_at(t + 1_000, b"R712\r");
        sonar.interface_mut().fail_read_on(b'\r');

        let err = sonar.add_single_measurement_result().unwrap_err();
        assert!(matches!(err, Error::Io(MockCommError)));
        assert_eq!(sonar.last_retry_budget().used(), 1);
        assert_eq!(sonar.results(), &[SENTINEL]);
        assert!(sonar.status().measurement_complete());
    }

    #[test]
    fn test_not_measuring_drains_and_records_sentinel() {
        let mut sonar = triggered();
        sonar.setup().unwrap();
        sonar.power_up().unwrap();
        sonar.interface_mut().stage_read_data(b"R1234\r");

        let err = sonar.add_single_measurement_result().unwrap_err();
        assert!(matches!(err, Error::NotMeasuring));
        assert_eq!(sonar.interface().available(), 0);
        assert_eq!(sonar.trigger_pin.as_ref().unwrap().rising_edges(), 0);
        assert_eq!(sonar.last_retry_budget().used(), 0);
        assert_eq!(sonar.results(), &[SENTINEL]);
        assert!(sonar.status().measurement_complete());
    }

    #[test]
    fn test_trigger_pulse_width() {
        let mut sonar = measuring(triggered());
        let t = sonar.interface().current_time_us();
        sonar.interface_mut().stage_read_data_at(t + 1_000, b"R800\r");
        sonar.add_single_measurement_result().unwrap();
        let trigger = sonar.trigger_pin.as_ref().unwrap();
        assert_eq!(trigger.history, vec![false, true, false]);
        assert!(!trigger.high);
    }

    #[test]
    fn test_untriggered_cycle() {
        let mut sonar: RangingSensor<MockInterface, MockPin, NoPin> =
            RangingSensor::new(MockInterface::new(), Some(MockPin::new()), None);
        sonar.setup().unwrap();
        // Banner arrives once warm, then a steady stream of readings.
        sonar.interface_mut().stage_read_data_at(150_000, b"HRXL\rMB7389\rC\rM\rP\rT\r");
        for i in 0..100u64 {
            sonar.interface_mut().stage_read_data_at(400_000 + i * 166_000, b"R1500\r");
        }

        let mut cycle = MeasurementCycle::new();
        cycle.run(&mut sonar, |s| s.interface_mut().advance_time(10_000));

        assert_eq!(cycle.failures(), 0);
        assert_eq!(sonar.results(), &[1500.0]);
        assert!(!sonar.status().is_powered());
    }
}
