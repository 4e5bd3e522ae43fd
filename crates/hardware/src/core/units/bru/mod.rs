//! Branch prediction unit (BRU) implementations.
//!
//! This module contains the gselect direction predictor, its saturating
//! counters, and the speculative predictor interface it implements.

pub use self::branch_predictor::{BpHistory, DirectionPredictor};
pub use self::gselect::GSelectPredictor;

/// Direction predictor trait and history snapshot.
pub mod branch_predictor;

/// Global history concatenated with PC (gselect algorithm).
pub mod gselect;

/// n-bit saturating counters.
pub mod sat_counter;
