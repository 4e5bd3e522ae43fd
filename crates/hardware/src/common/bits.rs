//! Bit manipulation helpers shared by the cache and predictor models.

use super::error::ConfigError;

/// Returns a mask with the low `bits` bits set.
#[inline]
pub const fn mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Returns `log2(value)` rounded up. `ceil_log2(1) == 0`.
#[inline]
pub const fn ceil_log2(value: usize) -> u32 {
    if value <= 1 {
        0
    } else {
        usize::BITS - (value - 1).leading_zeros()
    }
}

/// Checks that `value` is a non-zero power of two.
///
/// # Errors
///
/// Returns [`ConfigError::NotPowerOfTwo`] naming the parameter `what`.
pub fn require_power_of_two(what: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value.is_power_of_two() {
        Ok(value)
    } else {
        Err(ConfigError::NotPowerOfTwo { what, value })
    }
}
