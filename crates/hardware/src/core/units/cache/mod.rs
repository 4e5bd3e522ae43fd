//! Set-Associative Cache Model.
//!
//! This module implements a tag-only set-associative cache that drives a
//! replacement policy the way a host cache does: every hit touches the hit way,
//! every miss asks the policy for a victim among the ways of the set and resets
//! the refilled way, and invalidations are reported to the policy. No data is
//! stored and no latency is modelled; the cache exists to exercise and measure
//! replacement decisions.

/// Cache replacement policy implementations (IPV recency stack).
pub mod policies;

use tracing::{debug, trace};

use self::policies::{IpvPolicy, ReplacementData, ReplacementPolicy};
use crate::common::error::ConfigError;
use crate::config::CacheConfig;
use crate::stats::CacheStats;

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Debug, Clone, Default)]
struct CacheLine {
    tag: u64,
    valid: bool,
    dirty: bool,
}

/// Result of a single cache access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    /// The line was present.
    pub hit: bool,
    /// Way that now holds the line.
    pub way: usize,
    /// Block address of the valid line that was replaced, if any.
    pub evicted: Option<u64>,
    /// The replaced line was dirty.
    pub writeback: bool,
}

/// Cache simulator implementing a set-associative cache with an IPV policy.
#[derive(Debug)]
pub struct CacheSim {
    lines: Vec<CacheLine>,
    repl: Vec<ReplacementData>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    policy: IpvPolicy,
    stats: CacheStats,
}

impl CacheSim {
    /// Creates a new cache simulator with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Cache configuration specifying size, associativity,
    ///   line size and promotion vector
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry or promotion vector is invalid.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let num_sets = config.num_sets()?;
        let vector = config.promotion_vector()?;
        let (policy, repl) = IpvPolicy::with_sets(num_sets, config.ways, vector)?;

        debug!(
            sets = num_sets,
            ways = config.ways,
            line_bytes = config.line_bytes,
            vector = ?policy.vector().entries(),
            "cache built"
        );

        Ok(Self {
            lines: vec![CacheLine::default(); num_sets * config.ways],
            repl,
            num_sets,
            ways: config.ways,
            line_bytes: config.line_bytes,
            policy,
            stats: CacheStats::default(),
        })
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Replacement policy state, for inspection.
    pub const fn policy(&self) -> &IpvPolicy {
        &self.policy
    }

    /// Access statistics collected so far.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Set index an address maps to.
    #[inline]
    pub fn set_of(&self, addr: u64) -> usize {
        ((addr as usize) / self.line_bytes) % self.num_sets
    }

    /// Splits an address into set index and tag.
    #[inline]
    fn locate(&self, addr: u64) -> (usize, u64) {
        let tag = addr / (self.line_bytes * self.num_sets) as u64;
        (self.set_of(addr), tag)
    }

    /// Block address of the line with `tag` in `set`.
    #[inline]
    fn block_addr(&self, set: usize, tag: u64) -> u64 {
        (tag * self.num_sets as u64 + set as u64) * self.line_bytes as u64
    }

    /// Way of `set` holding `tag`, if present.
    fn find(&self, set: usize, tag: u64) -> Option<usize> {
        let base = set * self.ways;
        self.lines[base..base + self.ways]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Checks if the cache contains the specified address.
    pub fn contains(&self, addr: u64) -> bool {
        let (set, tag) = self.locate(addr);
        self.find(set, tag).is_some()
    }

    /// Accesses the cache for the specified address.
    ///
    /// On a hit the way is touched. On a miss the policy picks a victim among
    /// the ways of the set, the line is installed there and the way is reset.
    ///
    /// # Arguments
    ///
    /// * `addr` - The address to access
    /// * `is_write` - Whether this is a write operation
    pub fn access(&mut self, addr: u64, is_write: bool) -> AccessOutcome {
        let (set, tag) = self.locate(addr);
        let base = set * self.ways;
        self.stats.record_access(is_write);

        if let Some(way) = self.find(set, tag) {
            self.policy.touch(&self.repl[base + way]);
            if is_write {
                self.lines[base + way].dirty = true;
            }
            self.stats.hits += 1;
            trace!(addr, set, way, "hit");
            return AccessOutcome {
                hit: true,
                way,
                evicted: None,
                writeback: false,
            };
        }

        self.stats.misses += 1;
        let way = self
            .policy
            .get_victim(&self.repl[base..base + self.ways])
            .position();
        let victim = &self.lines[base + way];
        let evicted = victim.valid.then(|| self.block_addr(set, victim.tag));
        let writeback = victim.valid && victim.dirty;
        if evicted.is_some() {
            self.stats.evictions += 1;
        }
        if writeback {
            self.stats.writebacks += 1;
        }

        self.lines[base + way] = CacheLine {
            tag,
            valid: true,
            dirty: is_write,
        };
        self.policy.reset(&self.repl[base + way]);
        trace!(addr, set, way, evicted = ?evicted, "miss");

        AccessOutcome {
            hit: false,
            way,
            evicted,
            writeback,
        }
    }

    /// Invalidates the line holding `addr`, if present.
    ///
    /// Returns `true` if a line was invalidated. The way is reported to the
    /// policy so that it becomes the preferred victim of its set.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        let (set, tag) = self.locate(addr);
        let Some(way) = self.find(set, tag) else {
            return false;
        };
        let idx = set * self.ways + way;
        self.lines[idx].valid = false;
        self.lines[idx].dirty = false;
        self.policy.invalidate(&self.repl[idx]);
        self.stats.invalidations += 1;
        trace!(addr, set, way, "invalidate");
        true
    }

    /// Invalidates every valid line.
    ///
    /// Returns the number of lines invalidated.
    pub fn flush(&mut self) -> usize {
        let mut flushed = 0;
        for idx in 0..self.lines.len() {
            if self.lines[idx].valid {
                self.lines[idx].valid = false;
                self.lines[idx].dirty = false;
                self.policy.invalidate(&self.repl[idx]);
                flushed += 1;
            }
        }
        self.stats.invalidations += flushed as u64;
        debug!(lines = flushed, "flush");
        flushed
    }
}
