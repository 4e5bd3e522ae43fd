//! Saturating Counter.
//!
//! An n-bit up/down counter that sticks at zero and at its maximum value,
//! as used in pattern history tables.

/// n-bit saturating counter (n ≤ 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatCounter {
    value: u8,
    max: u8,
}

impl SatCounter {
    /// Creates a counter of `bits` bits starting at zero.
    ///
    /// Widths above 8 are clamped to 8; callers validate the configured width.
    pub const fn new(bits: u32) -> Self {
        let bits = if bits > 8 { 8 } else { bits };
        Self {
            value: 0,
            max: ((1u16 << bits) - 1) as u8,
        }
    }

    /// Current value.
    #[inline]
    pub const fn value(self) -> u8 {
        self.value
    }

    /// Counts up, saturating at the maximum.
    #[inline]
    pub const fn increment(&mut self) {
        if self.value < self.max {
            self.value += 1;
        }
    }

    /// Counts down, saturating at zero.
    #[inline]
    pub const fn decrement(&mut self) {
        if self.value > 0 {
            self.value -= 1;
        }
    }
}
