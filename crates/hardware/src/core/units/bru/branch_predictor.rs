//! Branch Predictor Interface.
//!
//! This module defines the `DirectionPredictor` trait that speculative
//! direction predictors implement. A lookup updates the global history
//! speculatively and returns a [`BpHistory`] snapshot; the snapshot is later
//! handed back to train the predictor or to roll the history back on a squash.

/// Speculative state captured at prediction time.
///
/// Passed back to [`DirectionPredictor::update`] or
/// [`DirectionPredictor::squash`] for the same branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpHistory {
    /// Global history register before the branch shifted into it.
    pub global_history: u64,
    /// Direction that was predicted.
    pub prediction: bool,
}

/// Trait for speculative branch direction predictors.
pub trait DirectionPredictor {
    /// Predicts whether a conditional branch will be taken.
    ///
    /// # Arguments
    ///
    /// * `tid` - Hardware thread issuing the branch
    /// * `pc` - Program counter of the branch instruction
    ///
    /// # Returns
    ///
    /// The predicted direction and the history snapshot to return later.
    fn lookup(&mut self, tid: usize, pc: u64) -> (bool, BpHistory);

    /// Records an unconditional branch, which is always taken.
    fn uncond_branch(&mut self, tid: usize, pc: u64) -> BpHistory;

    /// Adjusts the speculative history after a BTB miss.
    ///
    /// Without a target the fetch unit falls through, so the newest history
    /// bit is forced to not-taken.
    fn btb_update(&mut self, tid: usize, pc: u64);

    /// Resolves a branch.
    ///
    /// # Arguments
    ///
    /// * `tid` - Hardware thread that issued the branch
    /// * `pc` - Program counter of the branch instruction
    /// * `taken` - Actual direction
    /// * `history` - Snapshot returned by the lookup
    /// * `squashed` - The branch was mispredicted and younger state is being
    ///   squashed: repair the history instead of training
    fn update(&mut self, tid: usize, pc: u64, taken: bool, history: BpHistory, squashed: bool);

    /// Restores the history register from a snapshot of a squashed branch.
    fn squash(&mut self, tid: usize, history: BpHistory);
}
