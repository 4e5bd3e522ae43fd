//! Error definitions.
//!
//! This module defines the error types surfaced by the simulator. It provides:
//! 1. **Configuration Errors:** Fatal construction-time problems (non power-of-two
//!    associativity, malformed promotion vectors, impossible predictor geometry).
//! 2. **Trace Errors:** I/O and parse failures while reading access traces.
//! 3. **Simulation Errors:** The union of both, returned by the top-level entry points.
//!
//! None of the replacement operations themselves return errors: once a policy has
//! been constructed, `touch`, `reset`, `invalidate` and victim selection always succeed.

use std::io;

use thiserror::Error;

/// Fatal configuration error raised while building a policy, cache or predictor.
///
/// A simulation must not start when one of these is returned; nothing is ever
/// silently replaced by a default.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A size parameter that must be a positive power of two is not.
    #[error("{what} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending parameter.
        what: &'static str,
        /// Value that was supplied.
        value: usize,
    },

    /// The promotion vector does not have exactly `ways + 1` entries.
    #[error("promotion vector for {ways} ways needs {} entries, got {found}", ways + 1)]
    PromotionLength {
        /// Associativity the vector was validated against.
        ways: usize,
        /// Number of entries supplied.
        found: usize,
    },

    /// A promotion vector entry names a rank outside `0..ways`.
    #[error("promotion vector entry {index} is {value}, must be below {ways}")]
    PromotionOutOfRange {
        /// Index of the offending entry.
        index: usize,
        /// Rank stored at that index.
        value: usize,
        /// Associativity the vector was validated against.
        ways: usize,
    },

    /// A named preset cannot be used with the requested associativity.
    #[error("promotion preset {preset} is defined for {expected} ways, cache has {ways}")]
    PresetWays {
        /// Preset name.
        preset: &'static str,
        /// Associativity the preset was tuned for.
        expected: usize,
        /// Associativity requested.
        ways: usize,
    },

    /// The cache geometry leaves no complete set.
    #[error("cache of {size_bytes} bytes cannot hold one set of {ways} x {line_bytes}-byte lines")]
    Geometry {
        /// Total cache size in bytes.
        size_bytes: usize,
        /// Line size in bytes.
        line_bytes: usize,
        /// Associativity.
        ways: usize,
    },

    /// The global history is wider than the predictor index.
    #[error("global history of {history_bits} bits exceeds the {index_bits}-bit predictor index")]
    HistoryTooLong {
        /// Requested history length.
        history_bits: u32,
        /// Index width derived from the predictor size.
        index_bits: u32,
    },

    /// Saturating counters must be between 1 and 8 bits wide.
    #[error("counter width must be within 1..=8 bits, got {0}")]
    CounterBits(u32),

    /// At least one hardware thread is required.
    #[error("predictor needs at least one thread")]
    NoThreads,

    /// A recency stack was addressed to a set that does not exist.
    #[error("set {set} is out of range, policy has {sets} sets")]
    UnknownSet {
        /// Requested set.
        set: usize,
        /// Number of instantiated sets.
        sets: usize,
    },

    /// A replacement recency stack covers the wrong number of ways.
    #[error("recency stack for {ways} ways cannot hold {found} ranks")]
    StackLength {
        /// Associativity of the policy.
        ways: usize,
        /// Number of ranks in the supplied stack.
        found: usize,
    },

    /// JSON could not be deserialized into a configuration.
    #[error("invalid configuration JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Failure while reading or parsing an access trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Underlying I/O failure.
    #[error("trace I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line could not be parsed into an event.
    #[error("trace line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Human-readable description of the problem.
        reason: String,
    },
}

/// Top-level error returned by the simulator entry points.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The trace could not be read.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// A configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    ConfigFile {
        /// Path that failed.
        path: String,
        /// Underlying I/O failure.
        source: io::Error,
    },
}
