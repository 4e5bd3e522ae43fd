//! Configuration system for the simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline cache geometry and predictor sizing.
//! 2. **Structures:** Cache (geometry + promotion vector) and gselect predictor config.
//! 3. **Enums:** Promotion vector presets.
//!
//! Configuration is supplied as JSON (`Config::from_json` / `Config::from_file`) or
//! built from `Config::default()`. Every field is optional in JSON and falls back to
//! the defaults below. Validation happens when the cache or predictor is built, so a
//! bad value is reported as a [`ConfigError`] rather than silently replaced.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::bits::require_power_of_two;
use crate::common::error::{ConfigError, SimError};
use crate::core::units::cache::policies::PromotionVector;

/// Default configuration constants for the simulator.
mod defaults {
    /// Default cache size in bytes (64 KiB).
    pub const CACHE_SIZE: usize = 64 * 1024;

    /// Default cache line size in bytes (64 bytes).
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity (16 ways, matching the published vector).
    pub const CACHE_WAYS: usize = 16;

    /// Default gselect pattern table size (4096 counters).
    pub const PREDICTOR_SIZE: usize = 4096;

    /// Default global history length in bits.
    pub const GLOBAL_HISTORY_BITS: u32 = 6;

    /// Default saturating counter width in bits.
    pub const COUNTER_BITS: u32 = 2;

    /// Default number of hardware threads (one history register each).
    pub const NUM_THREADS: usize = 1;

    /// Default PC shift before indexing (4-byte instructions).
    pub const INST_SHIFT_AMT: u32 = 2;
}

/// Named promotion vector presets.
///
/// Selects the insertion/promotion vector used by the replacement policy
/// when no explicit vector is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PromotionPreset {
    /// Published vector tuned for 16-way caches.
    ///
    /// Only valid when the cache has 16 ways.
    #[default]
    Paper,
    /// Promote and insert at rank 0 (classic LRU).
    #[serde(alias = "LRU")]
    Lru,
    /// Promote to rank 0, insert at the LRU rank.
    #[serde(alias = "LIP")]
    Lip,
}

impl PromotionPreset {
    /// Builds the preset's vector for `ways` ways.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PresetWays`] if the preset does not exist for `ways`.
    pub fn vector(self, ways: usize) -> Result<PromotionVector, ConfigError> {
        match self {
            Self::Paper => PromotionVector::paper(ways),
            Self::Lru => Ok(PromotionVector::lru(ways)),
            Self::Lip => Ok(PromotionVector::lip(ways)),
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use ipvsim_core::config::{Config, PromotionPreset};
///
/// let json = r#"{
///     "cache": {
///         "size_bytes": 4096,
///         "ways": 4,
///         "preset": "Lip"
///     },
///     "branch_predictor": {
///         "enabled": true,
///         "global_history_bits": 4
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cache.ways, 4);
/// assert_eq!(config.cache.line_bytes, 64);
/// assert_eq!(config.cache.preset, PromotionPreset::Lip);
/// assert!(config.branch_predictor.enabled);
/// assert_eq!(config.branch_predictor.predictor_size, 4096);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache geometry and replacement configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Branch predictor configuration
    #[serde(default)]
    pub branch_predictor: GSelectConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigFile`] if the file cannot be read and
    /// [`SimError::Config`] if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimError::ConfigFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_json(&text)?)
    }
}

/// Cache geometry and replacement configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Promotion vector preset, used when `promotion_vector` is absent
    #[serde(default)]
    pub preset: PromotionPreset,

    /// Explicit promotion vector (`ways + 1` entries, insertion rank last)
    #[serde(default)]
    pub promotion_vector: Option<Vec<usize>>,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Number of sets implied by the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPowerOfTwo`] for a bad line size or
    /// associativity and [`ConfigError::Geometry`] if not even one set fits.
    pub fn num_sets(&self) -> Result<usize, ConfigError> {
        let line = require_power_of_two("line_bytes", self.line_bytes)?;
        let ways = require_power_of_two("ways", self.ways)?;
        let sets = self.size_bytes / (line * ways);
        if sets == 0 {
            return Err(ConfigError::Geometry {
                size_bytes: self.size_bytes,
                line_bytes: line,
                ways,
            });
        }
        Ok(sets)
    }

    /// Resolves the promotion vector: the explicit one if given, else the preset.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the explicit vector or the preset.
    pub fn promotion_vector(&self) -> Result<PromotionVector, ConfigError> {
        match &self.promotion_vector {
            Some(entries) => PromotionVector::new(entries.clone(), self.ways),
            None => self.preset.vector(self.ways),
        }
    }
}

impl Default for CacheConfig {
    /// Creates a default cache configuration.
    ///
    /// 64 KiB, 64-byte lines, 16 ways, published promotion vector.
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            preset: PromotionPreset::default(),
            promotion_vector: None,
        }
    }
}

/// gselect branch predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GSelectConfig {
    /// Model the predictor while replaying branch events
    #[serde(default)]
    pub enabled: bool,

    /// Number of saturating counters (power of two)
    #[serde(default = "GSelectConfig::default_predictor_size")]
    pub predictor_size: usize,

    /// Global history bits concatenated into the index
    #[serde(default = "GSelectConfig::default_history_bits")]
    pub global_history_bits: u32,

    /// Width of each saturating counter in bits
    #[serde(default = "GSelectConfig::default_counter_bits")]
    pub counter_bits: u32,

    /// Hardware threads, each with its own history register
    #[serde(default = "GSelectConfig::default_threads")]
    pub num_threads: usize,

    /// Low PC bits dropped before indexing
    #[serde(default = "GSelectConfig::default_inst_shift")]
    pub inst_shift_amt: u32,
}

impl GSelectConfig {
    /// Returns the default pattern table size.
    fn default_predictor_size() -> usize {
        defaults::PREDICTOR_SIZE
    }

    /// Returns the default global history length.
    fn default_history_bits() -> u32 {
        defaults::GLOBAL_HISTORY_BITS
    }

    /// Returns the default counter width.
    fn default_counter_bits() -> u32 {
        defaults::COUNTER_BITS
    }

    /// Returns the default thread count.
    fn default_threads() -> usize {
        defaults::NUM_THREADS
    }

    /// Returns the default PC shift.
    fn default_inst_shift() -> u32 {
        defaults::INST_SHIFT_AMT
    }
}

impl Default for GSelectConfig {
    /// Creates a default predictor configuration (disabled).
    fn default() -> Self {
        Self {
            enabled: false,
            predictor_size: defaults::PREDICTOR_SIZE,
            global_history_bits: defaults::GLOBAL_HISTORY_BITS,
            counter_bits: defaults::COUNTER_BITS,
            num_threads: defaults::NUM_THREADS,
            inst_shift_amt: defaults::INST_SHIFT_AMT,
        }
    }
}
