// src/lifecycle/controller.rs

use super::Sensor;
use log::{debug, info, warn};

/// Where a [`MeasurementCycle`] currently is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CycleStep {
    Idle,
    WarmingUp,
    Stabilizing,
    Measuring,
    Finishing,
    Done,
}

/// Outcome of one [`MeasurementCycle::poll`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CycleProgress {
    /// Nothing to do until more time has passed.
    Waiting,
    /// A hook ran and the cycle moved to the given step.
    Advanced(CycleStep),
    /// Results are final and the sensor is powered down.
    Finished,
}

/// Non-blocking driver for one full acquisition run: power up, wait for
/// warm-up, wake, then repeat start/wait/retrieve until the averaging count
/// is reached, average, power down.
///
/// Hook failures never stop the run. They set the sensor's error flag and
/// the run carries on so that every result slot ends up written.
#[derive(Debug, Clone)]
pub struct MeasurementCycle {
    step: CycleStep,
    failures: u8,
}

impl Default for MeasurementCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementCycle {
    pub const fn new() -> Self {
        MeasurementCycle { step: CycleStep::Idle, failures: 0 }
    }

    pub fn step(&self) -> CycleStep {
        self.step
    }

    /// Hook failures seen during the current run.
    pub fn failures(&self) -> u8 {
        self.failures
    }

    pub fn is_finished(&self) -> bool {
        self.step == CycleStep::Done
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advances the cycle by at most one hook call.
    pub fn poll<S: Sensor>(&mut self, sensor: &mut S) -> CycleProgress {
        match self.step {
            CycleStep::Idle => {
                info!("Starting measurement run on {} at {}", sensor.name(), sensor.location());
                sensor.core_mut().clear_values();
                sensor.core_mut().status_mut().clear_error();
                self.failures = 0;
                self.step = match sensor.power_up() {
                    Ok(()) => CycleStep::WarmingUp,
                    Err(e) => {
                        self.fail(sensor, "power up", &e);
                        CycleStep::Finishing
                    }
                };
                CycleProgress::Advanced(self.step)
            }
            CycleStep::WarmingUp => {
                let now = sensor.now();
                if !sensor.core().is_warmed_up(now) {
                    return CycleProgress::Waiting;
                }
                self.step = match sensor.wake() {
                    Ok(()) => CycleStep::Stabilizing,
                    Err(e) => {
                        self.fail(sensor, "wake", &e);
                        CycleStep::Finishing
                    }
                };
                CycleProgress::Advanced(self.step)
            }
            CycleStep::Stabilizing => {
                let now = sensor.now();
                if !sensor.core().is_stable(now) {
                    return CycleProgress::Waiting;
                }
                if let Err(e) = sensor.start_single_measurement() {
                    self.fail(sensor, "start measurement", &e);
                }
                self.step = if sensor.core().measurement_in_flight() {
                    CycleStep::Measuring
                } else {
                    // Nothing to wait for; count the attempt and move on.
                    sensor.core_mut().complete_measurement();
                    self.next_after_measurement(sensor)
                };
                CycleProgress::Advanced(self.step)
            }
            CycleStep::Measuring => {
                let now = sensor.now();
                if !sensor.core().is_measurement_ready(now) {
                    return CycleProgress::Waiting;
                }
                if let Err(e) = sensor.add_single_measurement_result() {
                    self.fail(sensor, "retrieve result", &e);
                }
                if sensor.core().measurement_in_flight() {
                    sensor.core_mut().complete_measurement();
                }
                self.step = self.next_after_measurement(sensor);
                CycleProgress::Advanced(self.step)
            }
            CycleStep::Finishing => {
                sensor.core_mut().average_measurements();
                if let Err(e) = sensor.power_down() {
                    self.fail(sensor, "power down", &e);
                }
                self.step = CycleStep::Done;
                info!(
                    "Measurement run on {} finished with {} failure(s): {:?}",
                    sensor.name(),
                    self.failures,
                    sensor.results()
                );
                CycleProgress::Finished
            }
            CycleStep::Done => CycleProgress::Finished,
        }
    }

    /// Polls until the run finishes, calling `idle` whenever the cycle is
    /// waiting on time to pass.
    pub fn run<S, F>(&mut self, sensor: &mut S, mut idle: F)
    where
        S: Sensor,
        F: FnMut(&mut S),
    {
        while self.poll(sensor) != CycleProgress::Finished {
            if self.step != CycleStep::Done {
                idle(sensor);
            }
        }
    }

    fn next_after_measurement<S: Sensor>(&self, sensor: &S) -> CycleStep {
        let core = sensor.core();
        if core.averaging_done() {
            CycleStep::Finishing
        } else {
            debug!(
                "{}: {} of {} measurements taken",
                sensor.name(),
                core.completed_measurements(),
                core.measurements_to_average()
            );
            CycleStep::Stabilizing
        }
    }

    fn fail<S: Sensor>(&mut self, sensor: &mut S, what: &str, e: &S::Error) {
        warn!("{} at {}: {} failed: {:?}", sensor.name(), sensor.location(), what, e);
        sensor.core_mut().status_mut().set_error();
        self.failures = self.failures.saturating_add(1);
    }
}
