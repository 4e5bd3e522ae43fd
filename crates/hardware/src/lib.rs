//! Cache replacement simulator library.
//!
//! This crate implements an insertion/promotion-vector (IPV) replacement engine and
//! the models needed to exercise it:
//! 1. **Replacement:** Per-set recency stacks re-ranked by a promotion vector on hit,
//!    fill and invalidation, plus victim selection.
//! 2. **Cache:** A tag-only set-associative cache that drives the policy.
//! 3. **Branch prediction:** A gselect direction predictor with speculative history.
//! 4. **Simulation:** Trace loading, replay, configuration, and statistics.

/// Common types (errors, bit helpers).
pub mod common;
/// Simulator configuration (defaults, presets, JSON loading).
pub mod config;
/// Cache and branch prediction units.
pub mod core;
/// Trace loading and replay.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load it from JSON.
pub use crate::config::Config;
/// Set-associative cache model.
pub use crate::core::units::cache::CacheSim;
/// IPV replacement policy and its interface.
pub use crate::core::units::cache::policies::{
    IpvPolicy, PromotionVector, Rank, RecencyStack, ReplacementData, ReplacementPolicy,
};
/// Trace replay driver.
pub use crate::sim::Simulator;
