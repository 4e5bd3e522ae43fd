//! Simulation statistics collection and reporting.
//!
//! This module tracks the metrics gathered while replaying a trace. It provides:
//! 1. **Summary:** Events replayed and host time.
//! 2. **Cache:** Accesses, hit/miss counts, evictions, write-backs and invalidations.
//! 3. **Branch prediction:** Lookups, mispredictions, and accuracy.

use std::fmt::{self, Write};
use std::time::Instant;

/// Cache access counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Read accesses.
    pub reads: u64,
    /// Write accesses.
    pub writes: u64,
    /// Accesses that found the line present.
    pub hits: u64,
    /// Accesses that had to fill a line.
    pub misses: u64,
    /// Fills that replaced a valid line.
    pub evictions: u64,
    /// Evictions of dirty lines.
    pub writebacks: u64,
    /// Lines invalidated by invalidate or flush.
    pub invalidations: u64,
}

impl CacheStats {
    /// Counts one access of the given kind.
    #[inline]
    pub const fn record_access(&mut self, is_write: bool) {
        if is_write {
            self.writes += 1;
        } else {
            self.reads += 1;
        }
    }

    /// Total accesses.
    pub const fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Miss ratio in percent (0 when nothing was accessed).
    pub fn miss_rate(&self) -> f64 {
        let total = self.accesses();
        if total > 0 {
            (self.misses as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Branch predictor counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchStats {
    /// Conditional branches predicted correctly.
    pub correct: u64,
    /// Conditional branches predicted wrongly.
    pub mispredictions: u64,
    /// Unconditional branches observed.
    pub unconditional: u64,
}

impl BranchStats {
    /// Conditional branch lookups.
    pub const fn lookups(&self) -> u64 {
        self.correct + self.mispredictions
    }

    /// Prediction accuracy in percent (0 when nothing was predicted).
    pub fn accuracy(&self) -> f64 {
        let total = self.lookups();
        if total > 0 {
            100.0 * (self.correct as f64 / total as f64)
        } else {
            0.0
        }
    }
}

/// Simulation statistics structure tracking all collected metrics.
#[derive(Debug, Clone)]
pub struct SimStats {
    start_time: Instant,
    /// Trace events replayed.
    pub events: u64,
    /// Cache counters.
    pub cache: CacheStats,
    /// Branch predictor counters.
    pub branch: BranchStats,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            events: 0,
            cache: CacheStats::default(),
            branch: BranchStats::default(),
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"cache"`, `"branch"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "cache", "branch"];

impl SimStats {
    /// Writes the requested statistics sections to `out`.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors from `out`.
    pub fn write_sections(&self, out: &mut impl Write, sections: &[String]) -> fmt::Result {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let rule = "----------------------------------------------------------";

        writeln!(out, "==========================================================")?;
        writeln!(out, "CACHE REPLACEMENT SIMULATION STATISTICS")?;
        writeln!(out, "==========================================================")?;
        if want("summary") {
            let seconds = self.start_time.elapsed().as_secs_f64();
            writeln!(out, "host_seconds             {seconds:.4} s")?;
            writeln!(out, "sim_events               {}", self.events)?;
            writeln!(out, "{rule}")?;
        }
        if want("cache") {
            let c = &self.cache;
            writeln!(out, "CACHE")?;
            writeln!(out, "  cache.accesses         {}", c.accesses())?;
            writeln!(out, "  cache.reads            {}", c.reads)?;
            writeln!(out, "  cache.writes           {}", c.writes)?;
            writeln!(out, "  cache.hits             {}", c.hits)?;
            writeln!(out, "  cache.misses           {}", c.misses)?;
            writeln!(out, "  cache.miss_rate        {:.2}%", c.miss_rate())?;
            writeln!(out, "  cache.evictions        {}", c.evictions)?;
            writeln!(out, "  cache.writebacks       {}", c.writebacks)?;
            writeln!(out, "  cache.invalidations    {}", c.invalidations)?;
            writeln!(out, "{rule}")?;
        }
        if want("branch") {
            let b = &self.branch;
            writeln!(out, "BRANCH PREDICTION")?;
            writeln!(out, "  bp.lookups             {}", b.lookups())?;
            writeln!(out, "  bp.mispredicts         {}", b.mispredictions)?;
            writeln!(out, "  bp.unconditional       {}", b.unconditional)?;
            writeln!(out, "  bp.accuracy            {:.2}%", b.accuracy())?;
            writeln!(out, "{rule}")?;
        }
        Ok(())
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let mut out = String::new();
        if self.write_sections(&mut out, sections).is_ok() {
            print!("{out}");
        }
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
