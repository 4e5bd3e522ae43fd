//! Core microarchitecture models.
//!
//! This module groups the functional units exercised by trace replay.

/// Functional units (branch predictor, cache and replacement policies).
pub mod units;
