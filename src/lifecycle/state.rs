// src/lifecycle/state.rs

use super::results::ResultVector;
use super::status::SensorStatus;
use super::SensorTiming;
use crate::common::{error::Error, hal_traits::Instant};
use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

/// State every sensor driver carries regardless of its wire protocol:
/// status, phase timestamps, and the result vector.
#[derive(Debug, Clone)]
pub struct SensorCore<I: Instant> {
    name: &'static str,
    timing: SensorTiming,
    status: SensorStatus,
    powered_at: Option<I>,
    awake_at: Option<I>,
    measurement_requested_at: Option<I>,
    results: ResultVector,
    measurements_to_average: u8,
    completed_measurements: u8,
}

impl<I: Instant> SensorCore<I> {
    pub fn new(name: &'static str, num_variables: usize, timing: SensorTiming) -> Self {
        SensorCore {
            name,
            timing,
            status: SensorStatus::new(),
            powered_at: None,
            awake_at: None,
            measurement_requested_at: None,
            results: ResultVector::new(num_variables),
            measurements_to_average: 1,
            completed_measurements: 0,
        }
    }

    /// Number of cycles averaged into one result set; at least 1.
    pub fn with_averaging(mut self, measurements: u8) -> Self {
        self.measurements_to_average = measurements.max(1);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn num_variables(&self) -> usize {
        self.results.len()
    }

    pub fn timing(&self) -> SensorTiming {
        self.timing
    }

    pub fn status(&self) -> SensorStatus {
        self.status
    }

    pub fn status_mut(&mut self) -> &mut SensorStatus {
        &mut self.status
    }

    pub fn results(&self) -> &ResultVector {
        &self.results
    }

    pub fn measurements_to_average(&self) -> u8 {
        self.measurements_to_average
    }

    pub fn completed_measurements(&self) -> u8 {
        self.completed_measurements
    }

    pub fn averaging_done(&self) -> bool {
        self.completed_measurements >= self.measurements_to_average
    }

    pub fn setup(&mut self) {
        self.status.mark_setup();
        self.measurement_requested_at = None;
    }

    /// Drives the power line high if there is one and stamps the power-on
    /// time. Re-powering an already powered sensor keeps the first stamp.
    pub fn power_up<P, E>(&mut self, pin: Option<&mut P>, now: I) -> Result<(), Error<E>>
    where
        P: OutputPin,
        E: Debug,
    {
        if self.status.is_powered() && self.powered_at.is_some() {
            debug!("{} was already powered", self.name);
            return Ok(());
        }
        if let Some(pin) = pin {
            pin.set_high().map_err(Error::<E>::pin)?;
        }
        self.powered_at = Some(now);
        self.status.mark_powered();
        debug!("Powering {}", self.name);
        Ok(())
    }

    /// Drives the power line low and forgets every phase timestamp.
    pub fn power_down<P, E>(&mut self, pin: Option<&mut P>) -> Result<(), Error<E>>
    where
        P: OutputPin,
        E: Debug,
    {
        if let Some(pin) = pin {
            pin.set_low().map_err(Error::<E>::pin)?;
        }
        self.powered_at = None;
        self.awake_at = None;
        self.measurement_requested_at = None;
        self.status.mark_powered_down();
        debug!("Turning off {}", self.name);
        Ok(())
    }

    /// Marks the sensor awake. Refused while unpowered.
    pub fn wake<E: Debug>(&mut self, now: I) -> Result<(), Error<E>> {
        if !self.status.is_powered() {
            warn!("{} is not powered, cannot wake", self.name);
            self.awake_at = None;
            return Err(Error::NotPowered);
        }
        self.awake_at = Some(now);
        self.status.mark_awake();
        Ok(())
    }

    pub fn is_warmed_up(&self, now: I) -> bool {
        self.powered_at.is_some_and(|t| now - t >= self.timing.warm_up)
    }

    pub fn is_stable(&self, now: I) -> bool {
        self.awake_at.is_some_and(|t| now - t >= self.timing.stabilization)
    }

    pub fn is_measurement_ready(&self, now: I) -> bool {
        self.measurement_requested_at
            .is_some_and(|t| now - t >= self.timing.measurement)
    }

    /// True between a successful start and the matching retrieval.
    pub fn measurement_in_flight(&self) -> bool {
        self.measurement_requested_at.is_some()
    }

    /// Moves to "requested". `None` means the start failed: the cycle still
    /// advances but retrieval will find nothing in flight.
    pub fn mark_measurement_requested(&mut self, at: Option<I>) {
        self.measurement_requested_at = at;
        self.status.mark_measurement_requested();
    }

    /// Closes the current cycle.
    pub fn complete_measurement(&mut self) {
        self.measurement_requested_at = None;
        self.status.mark_measurement_complete();
        self.completed_measurements = self.completed_measurements.saturating_add(1);
    }

    /// Stores one reading; invalid ones are recorded as the sentinel and
    /// left out of the average.
    pub fn verify_and_add_measurement_result(&mut self, index: usize, value: f32) -> bool {
        if index >= self.results.len() {
            warn!("{} has no result slot {}", self.name, index);
            return false;
        }
        self.results.record(index, value)
    }

    pub fn average_measurements(&mut self) {
        self.results.average();
    }

    /// Resets the result vector and averaging counters for a new run.
    pub fn clear_values(&mut self) {
        self.results.clear();
        self.completed_measurements = 0;
    }
}
