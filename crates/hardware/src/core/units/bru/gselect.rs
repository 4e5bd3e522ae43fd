//! GSelect Branch Predictor.
//!
//! GSelect concatenates the low bits of the global history register with the low
//! bits of the branch PC to index a single table of saturating counters. Each
//! hardware thread keeps its own history register, updated speculatively at
//! lookup time and repaired from the snapshot when a branch is squashed.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `lookup()`: O(1)
//!   - `update()`: O(1)
//! - **Space Complexity:** O(N) counters where N is the predictor size
//! - **Hardware Cost:** Low - no hashing, a single table read
//! - **Best Case:** Branches correlated with a short global history
//! - **Worst Case:** Many branches aliasing in the few PC bits left beside the history

use tracing::trace;

use super::branch_predictor::{BpHistory, DirectionPredictor};
use super::sat_counter::SatCounter;
use crate::common::bits::{ceil_log2, mask, require_power_of_two};
use crate::common::error::ConfigError;
use crate::config::GSelectConfig;

/// GSelect Predictor structure.
#[derive(Debug, Clone)]
pub struct GSelectPredictor {
    /// Global History Register per thread.
    global_history: Vec<u64>,
    /// Mask selecting the history bits used in the index.
    history_mask: u64,
    /// Number of PC bits in the index.
    address_bits: u32,
    /// Mask selecting the PC bits used in the index.
    address_mask: u64,
    /// Mask covering the whole index.
    index_mask: u64,
    /// Low PC bits dropped before indexing.
    inst_shift: u32,
    /// Pattern table of saturating counters.
    counters: Vec<SatCounter>,
    /// Counters above this value predict taken.
    threshold: u8,
}

impl GSelectPredictor {
    /// Creates a new GSelect Predictor.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the table size is not a power of two, the
    /// history is wider than the index, the counter width is outside `1..=8`,
    /// or no thread is configured.
    pub fn new(config: &GSelectConfig) -> Result<Self, ConfigError> {
        let size = require_power_of_two("predictor_size", config.predictor_size)?;
        let index_bits = ceil_log2(size);
        if config.global_history_bits > index_bits {
            return Err(ConfigError::HistoryTooLong {
                history_bits: config.global_history_bits,
                index_bits,
            });
        }
        if !(1..=8).contains(&config.counter_bits) {
            return Err(ConfigError::CounterBits(config.counter_bits));
        }
        if config.num_threads == 0 {
            return Err(ConfigError::NoThreads);
        }

        let address_bits = index_bits - config.global_history_bits;
        Ok(Self {
            global_history: vec![0; config.num_threads],
            history_mask: mask(config.global_history_bits),
            address_bits,
            address_mask: mask(address_bits),
            index_mask: mask(index_bits),
            inst_shift: config.inst_shift_amt,
            counters: vec![SatCounter::new(config.counter_bits); size],
            threshold: ((1u16 << (config.counter_bits - 1)) - 1) as u8,
        })
    }

    /// Calculates the index into the pattern table.
    ///
    /// History bits form the upper part of the index, PC bits the lower part.
    pub const fn index(&self, history: u64, pc: u64) -> usize {
        let history_part = (history & self.history_mask) << self.address_bits;
        let pc_part = (pc >> self.inst_shift) & self.address_mask;
        ((history_part | pc_part) & self.index_mask) as usize
    }

    /// Current (speculative) global history of `tid`.
    ///
    /// # Panics
    ///
    /// Panics if `tid` is not a configured thread.
    pub fn global_history(&self, tid: usize) -> u64 {
        self.global_history[tid]
    }

    /// Counter value at `index`, for inspection.
    pub fn counter(&self, index: usize) -> Option<u8> {
        self.counters.get(index).map(|c| c.value())
    }

    /// Shifts an outcome into the history register of `tid`.
    fn push_history(&mut self, tid: usize, taken: bool) {
        let ghr = &mut self.global_history[tid];
        *ghr = ((*ghr << 1) | taken as u64) & self.history_mask;
    }

    fn snapshot(&self, tid: usize, prediction: bool) -> BpHistory {
        BpHistory {
            global_history: self.global_history[tid] & self.history_mask,
            prediction,
        }
    }
}

impl DirectionPredictor for GSelectPredictor {
    /// Predicts taken when the indexed counter is above the threshold.
    ///
    /// The prediction is shifted into the history register immediately.
    fn lookup(&mut self, tid: usize, pc: u64) -> (bool, BpHistory) {
        let idx = self.index(self.global_history[tid], pc);
        let prediction = self.counters[idx].value() > self.threshold;
        let history = self.snapshot(tid, prediction);
        self.push_history(tid, prediction);
        trace!(tid, pc, idx, prediction, "gselect lookup");
        (prediction, history)
    }

    /// Records an always-taken branch in the history.
    fn uncond_branch(&mut self, tid: usize, _pc: u64) -> BpHistory {
        let history = self.snapshot(tid, true);
        self.push_history(tid, true);
        history
    }

    /// Clears the newest history bit.
    fn btb_update(&mut self, tid: usize, _pc: u64) {
        self.global_history[tid] &= self.history_mask & !1;
    }

    /// Trains the counter selected by the snapshot, or repairs the history
    /// of a squashed branch with its actual outcome.
    fn update(&mut self, tid: usize, pc: u64, taken: bool, history: BpHistory, squashed: bool) {
        if squashed {
            self.global_history[tid] =
                ((history.global_history << 1) | taken as u64) & self.history_mask;
            trace!(tid, pc, ghr = self.global_history[tid], "gselect history repaired");
            return;
        }

        let idx = self.index(history.global_history, pc);
        if taken {
            self.counters[idx].increment();
        } else {
            self.counters[idx].decrement();
        }
    }

    /// Rolls the history back to the snapshot.
    fn squash(&mut self, tid: usize, history: BpHistory) {
        self.global_history[tid] = history.global_history & self.history_mask;
    }
}
