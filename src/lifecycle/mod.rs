// src/lifecycle/mod.rs

//! Protocol-independent sensor lifecycle.
//!
//! A sensor goes set up, powered, awake, measurement requested, measurement
//! complete, and back. [`SensorCore`] keeps the bookkeeping for that,
//! [`Sensor`] is the hook surface a driver fills in, and
//! [`MeasurementCycle`] drives a sensor through one full cycle without
//! blocking.

pub mod controller;
pub mod results;
pub mod state;
pub mod status;

pub use self::controller::{CycleProgress, CycleStep, MeasurementCycle};
pub use self::state::SensorCore;
pub use self::results::ResultVector;
pub use self::status::{LifecyclePhase, MeasurementState, SensorStatus};

use crate::common::hal_traits::Instant;
use core::convert::Infallible;
use core::fmt::Debug;
use core::time::Duration;

/// Human-readable description of where a sensor is attached.
pub type Location = heapless::String<32>;

/// Fixed timing characteristics of a sensor type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SensorTiming {
    /// Time from power-on until the sensor can take commands.
    pub warm_up: Duration,
    /// Time from wake until readings are stable.
    pub stabilization: Duration,
    /// Time from measurement start until results are ready.
    pub measurement: Duration,
}

impl SensorTiming {
    pub const fn new(warm_up: Duration, stabilization: Duration, measurement: Duration) -> Self {
        SensorTiming { warm_up, stabilization, measurement }
    }

    pub const fn from_millis(warm_up: u64, stabilization: u64, measurement: u64) -> Self {
        SensorTiming {
            warm_up: Duration::from_millis(warm_up),
            stabilization: Duration::from_millis(stabilization),
            measurement: Duration::from_millis(measurement),
        }
    }
}

/// Stand-in for an absent power or trigger line.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoPin;

impl embedded_hal::digital::ErrorType for NoPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Lifecycle hooks a sensor driver implements.
///
/// Every hook updates the shared [`SensorCore`] so that status and results
/// stay consistent no matter which hook failed.
pub trait Sensor {
    type Instant: Instant;
    type Error: Debug;

    fn core(&self) -> &SensorCore<Self::Instant>;
    fn core_mut(&mut self) -> &mut SensorCore<Self::Instant>;

    /// Current time on the driver's clock.
    fn now(&self) -> Self::Instant;

    fn location(&self) -> Location;

    fn name(&self) -> &'static str {
        self.core().name()
    }

    fn status(&self) -> SensorStatus {
        self.core().status()
    }

    fn results(&self) -> &[f32] {
        self.core().results().values()
    }

    fn setup(&mut self) -> Result<(), Self::Error>;
    fn power_up(&mut self) -> Result<(), Self::Error>;
    fn wake(&mut self) -> Result<(), Self::Error>;
    fn start_single_measurement(&mut self) -> Result<(), Self::Error>;
    fn add_single_measurement_result(&mut self) -> Result<(), Self::Error>;
    fn power_down(&mut self) -> Result<(), Self::Error>;
}
