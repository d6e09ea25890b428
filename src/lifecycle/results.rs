// src/lifecycle/results.rs

use crate::common::types::{is_sentinel, normalize_reading, MAX_VARIABLES, SENTINEL};

/// Per-cycle results plus the running sums used for averaging.
///
/// Slots are positional and fixed in number for a sensor type. Slots with
/// no valid reading hold [`SENTINEL`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultVector {
    values: heapless::Vec<f32, MAX_VARIABLES>,
    sums: [f32; MAX_VARIABLES],
    valid: [u8; MAX_VARIABLES],
}

impl ResultVector {
    /// `len` is clamped to [`MAX_VARIABLES`].
    pub fn new(len: usize) -> Self {
        let mut values = heapless::Vec::new();
        for _ in 0..len.min(MAX_VARIABLES) {
            let _ = values.push(SENTINEL);
        }
        ResultVector { values, sums: [0.0; MAX_VARIABLES], valid: [0; MAX_VARIABLES] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// How many valid readings slot `index` has accumulated.
    pub fn valid_count(&self, index: usize) -> u8 {
        self.valid.get(index).copied().unwrap_or(0)
    }

    /// Overwrites slot `index` with a normalized reading and, if it is
    /// valid, adds it to the running average. Returns whether it was valid.
    /// Out-of-range indices are ignored.
    pub fn record(&mut self, index: usize, value: f32) -> bool {
        let Some(slot) = self.values.get_mut(index) else {
            return false;
        };
        let value = normalize_reading(value);
        *slot = value;
        if is_sentinel(value) {
            return false;
        }
        self.sums[index] += value;
        self.valid[index] = self.valid[index].saturating_add(1);
        true
    }

    /// Replaces every slot with the mean of its valid readings, or the
    /// sentinel where there were none.
    pub fn average(&mut self) {
        for (i, slot) in self.values.iter_mut().enumerate() {
            *slot = match self.valid[i] {
                0 => SENTINEL,
                n => self.sums[i] / f32::from(n),
            };
        }
    }

    /// Resets every slot and the accumulators.
    pub fn clear(&mut self) {
        for slot in self.values.iter_mut() {
            *slot = SENTINEL;
        }
        self.sums = [0.0; MAX_VARIABLES];
        self.valid = [0; MAX_VARIABLES];
    }
}
