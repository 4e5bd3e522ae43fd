//! Trace-driven simulation.
//!
//! Provides trace loading and the simulator that replays traces through the
//! cache and branch predictor models.

/// Trace replay driver.
pub mod simulator;

/// Trace format and loading.
pub mod trace;

pub use simulator::Simulator;
pub use trace::{Event, load_trace, parse_trace};
