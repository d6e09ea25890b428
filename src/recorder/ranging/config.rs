// src/recorder/ranging/config.rs

use crate::common::timing;
use core::time::Duration;

/// Which integer readings count as real ranges.
///
/// MaxBotix sonars report fixed values for "too close", "nothing in range"
/// and internal faults. Those, zero, and anything at or under the blanking
/// distance are rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    /// Readings must be strictly greater than this (mm).
    pub min_exclusive: i32,
    /// Readings the sensor uses as error markers.
    pub rejected: &'static [i32],
}

impl RangeFilter {
    /// HRXL-MaxSonar-WRL 10 m models.
    pub const fn hrxl_10m() -> Self {
        RangeFilter { min_exclusive: 300, rejected: &[500, 4999, 9999] }
    }

    /// HRXL-MaxSonar-WRL 5 m models.
    pub const fn hrxl_5m() -> Self {
        RangeFilter { min_exclusive: 300, rejected: &[4999] }
    }

    pub fn accepts(&self, reading: i32) -> bool {
        reading != 0 && reading > self.min_exclusive && !self.rejected.contains(&reading)
    }
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self::hrxl_10m()
    }
}

/// Tunables for a continuous-output ranging sensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RangingConfig {
    /// Lines of power-on banner discarded by `wake`.
    pub header_lines: u8,
    /// Trigger/parse attempts per retrieval.
    pub max_attempts: u8,
    pub read_timeout: Duration,
    /// Trigger high time; the sonar needs more than 20 us.
    pub trigger_pulse: Duration,
    /// Trigger pin number, used only in the location string.
    pub trigger_pin: Option<u8>,
    pub filter: RangeFilter,
}

impl RangingConfig {
    pub const fn new() -> Self {
        RangingConfig {
            header_lines: 6,
            max_attempts: 25,
            read_timeout: timing::RANGING_READ_TIMEOUT,
            trigger_pulse: timing::TRIGGER_PULSE,
            trigger_pin: None,
            filter: RangeFilter::hrxl_10m(),
        }
    }

    pub const fn with_trigger_pin(mut self, pin: u8) -> Self {
        self.trigger_pin = Some(pin);
        self
    }

    pub const fn with_filter(mut self, filter: RangeFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self::new()
    }
}
