//! Simulator: owns the cache and the optional branch predictor side-by-side.
//!
//! Replays trace events one at a time, routing memory events to the cache
//! and branch events to the predictor, and keeps the combined statistics.

use tracing::{debug, info};

use super::trace::Event;
use crate::common::error::ConfigError;
use crate::config::Config;
use crate::core::units::bru::{DirectionPredictor, GSelectPredictor};
use crate::core::units::cache::CacheSim;
use crate::stats::SimStats;

/// Hardware thread used for every branch in a single-threaded trace.
const TRACE_THREAD: usize = 0;

/// Top-level simulator: cache model + branch predictor.
#[derive(Debug)]
pub struct Simulator {
    /// Cache under test.
    pub cache: CacheSim,
    /// Branch predictor, present when enabled in the configuration.
    pub predictor: Option<GSelectPredictor>,
    stats: SimStats,
}

impl Simulator {
    /// Creates a new simulator from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the cache or predictor configuration is invalid.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let cache = CacheSim::new(&config.cache)?;
        let predictor = if config.branch_predictor.enabled {
            Some(GSelectPredictor::new(&config.branch_predictor)?)
        } else {
            None
        };
        info!(
            sets = cache.num_sets(),
            ways = cache.ways(),
            predictor = predictor.is_some(),
            "simulator ready"
        );
        Ok(Self {
            cache,
            predictor,
            stats: SimStats::default(),
        })
    }

    /// Applies one trace event.
    pub fn step(&mut self, event: &Event) {
        self.stats.events += 1;
        match *event {
            Event::Read(addr) => {
                let _ = self.cache.access(addr, false);
            }
            Event::Write(addr) => {
                let _ = self.cache.access(addr, true);
            }
            Event::Invalidate(addr) => {
                if !self.cache.invalidate(addr) {
                    debug!(addr, "invalidate of absent line");
                }
            }
            Event::Flush => {
                let _ = self.cache.flush();
            }
            Event::Branch { pc, taken } => self.branch(pc, taken),
            Event::Jump(pc) => {
                if let Some(bp) = self.predictor.as_mut() {
                    let history = bp.uncond_branch(TRACE_THREAD, pc);
                    bp.update(TRACE_THREAD, pc, true, history, false);
                    self.stats.branch.unconditional += 1;
                }
            }
        }
    }

    /// Predicts, repairs on mispredict, then trains.
    fn branch(&mut self, pc: u64, taken: bool) {
        let Some(bp) = self.predictor.as_mut() else {
            return;
        };
        let (prediction, history) = bp.lookup(TRACE_THREAD, pc);
        if prediction == taken {
            self.stats.branch.correct += 1;
        } else {
            self.stats.branch.mispredictions += 1;
            bp.update(TRACE_THREAD, pc, taken, history, true);
        }
        bp.update(TRACE_THREAD, pc, taken, history, false);
    }

    /// Replays a sequence of events.
    pub fn run<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            self.step(event);
        }
    }

    /// Statistics so far, with the cache counters folded in.
    pub fn stats(&self) -> SimStats {
        let mut stats = self.stats.clone();
        stats.cache = self.cache.stats().clone();
        stats
    }
}
