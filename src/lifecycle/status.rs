// src/lifecycle/status.rs

/// How far a sensor has been brought up.
///
/// Phases are ordered: reaching a phase implies every earlier one was
/// passed, so "awake" implies "powered".
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecyclePhase {
    Unconfigured,
    Ready,
    Powered,
    Awake,
}

/// Where the current measurement cycle stands. Independent of the power
/// phase: a failed start still counts as "requested" on a sensor that
/// never powered up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeasurementState {
    Idle,
    Requested,
    Complete,
}

/// Power phase, measurement state, and an error flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SensorStatus {
    phase: LifecyclePhase,
    measurement: MeasurementState,
    error: bool,
}

impl Default for SensorStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorStatus {
    pub const BIT_SETUP: u8 = 1 << 0;
    pub const BIT_POWERED: u8 = 1 << 1;
    pub const BIT_AWAKE: u8 = 1 << 2;
    pub const BIT_REQUESTED: u8 = 1 << 5;
    pub const BIT_COMPLETE: u8 = 1 << 6;
    pub const BIT_ERROR: u8 = 1 << 7;

    pub const fn new() -> Self {
        SensorStatus {
            phase: LifecyclePhase::Unconfigured,
            measurement: MeasurementState::Idle,
            error: false,
        }
    }

    #[inline]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    #[inline]
    pub fn measurement(&self) -> MeasurementState {
        self.measurement
    }

    #[inline]
    pub fn is_set_up(&self) -> bool {
        self.phase >= LifecyclePhase::Ready
    }

    #[inline]
    pub fn is_powered(&self) -> bool {
        self.phase >= LifecyclePhase::Powered
    }

    #[inline]
    pub fn is_awake(&self) -> bool {
        self.phase >= LifecyclePhase::Awake
    }

    #[inline]
    pub fn measurement_requested(&self) -> bool {
        self.measurement == MeasurementState::Requested
    }

    #[inline]
    pub fn measurement_complete(&self) -> bool {
        self.measurement == MeasurementState::Complete
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn mark_setup(&mut self) {
        if self.phase < LifecyclePhase::Ready {
            self.phase = LifecyclePhase::Ready;
        }
        self.error = false;
    }

    pub fn mark_powered(&mut self) {
        if self.phase < LifecyclePhase::Powered {
            self.phase = LifecyclePhase::Powered;
        }
    }

    pub fn mark_awake(&mut self) {
        if self.phase < LifecyclePhase::Awake {
            self.phase = LifecyclePhase::Awake;
        }
    }

    /// Enters "requested", leaving "complete". The power phase is untouched.
    pub fn mark_measurement_requested(&mut self) {
        self.measurement = MeasurementState::Requested;
    }

    /// Enters "complete", leaving "requested". The power phase is untouched.
    pub fn mark_measurement_complete(&mut self) {
        self.measurement = MeasurementState::Complete;
    }

    /// Back to "set up but unpowered"; a cycle in progress is abandoned.
    pub fn mark_powered_down(&mut self) {
        if self.phase > LifecyclePhase::Ready {
            self.phase = LifecyclePhase::Ready;
        }
        self.measurement = MeasurementState::Idle;
    }

    pub fn set_error(&mut self) {
        self.error = true;
    }

    pub fn clear_error(&mut self) {
        self.error = false;
    }

    /// Packed view of the status:
    /// bit0 set up, bit1 powered, bit2 awake, bit5 measurement requested,
    /// bit6 measurement complete, bit7 error.
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.is_set_up() {
            bits |= Self::BIT_SETUP;
        }
        if self.is_powered() {
            bits |= Self::BIT_POWERED;
        }
        if self.is_awake() {
            bits |= Self::BIT_AWAKE;
        }
        if self.measurement_requested() {
            bits |= Self::BIT_REQUESTED;
        }
        if self.measurement_complete() {
            bits |= Self::BIT_COMPLETE;
        }
        if self.error {
            bits |= Self::BIT_ERROR;
        }
        bits
    }
}
