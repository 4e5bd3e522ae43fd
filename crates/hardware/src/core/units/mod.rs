//! Functional units modelled by the simulator.
//!
//! This module contains the branch prediction unit and the cache with its
//! replacement policies.

/// Branch prediction unit (gselect direction predictor).
pub mod bru;

/// Set-associative cache model with replacement policies.
pub mod cache;
