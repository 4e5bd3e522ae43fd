//! Common utilities and types used throughout the simulator.
//!
//! This module provides the building blocks shared by the cache and predictor
//! models. It includes:
//! 1. **Error Handling:** Configuration, trace and simulation error types.
//! 2. **Bit Helpers:** Masks, logarithms and power-of-two validation.

/// Bit manipulation helpers.
pub mod bits;

/// Error types.
pub mod error;

pub use bits::{ceil_log2, mask, require_power_of_two};
pub use error::{ConfigError, SimError, TraceError};
