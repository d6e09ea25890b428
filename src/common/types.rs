// src/common/types.rs

/// Reserved value written into result slots that hold no valid reading.
pub const SENTINEL: f32 = -9999.0;

/// Largest number of values any supported sensor reports in one cycle.
/// Matches the two-digit value count of an SDI-12 concurrent measurement
/// reply, capped to what a single `aD0!` can carry.
pub const MAX_VARIABLES: usize = 20;

/// Normalizes a parsed reading: NaN and the sentinel itself both become
/// the sentinel, anything else passes through.
#[inline]
pub fn normalize_reading(value: f32) -> f32 {
    if value.is_nan() || value == SENTINEL {
        SENTINEL
    } else {
        value
    }
}

#[inline]
pub fn is_sentinel(value: f32) -> bool {
    value == SENTINEL
}
