//! Insertion/Promotion Vector (IPV) Replacement Policy.
//!
//! Each set keeps a recency stack ranking its ways from most recently useful
//! (rank 0) to least useful (rank `W-1`). Unlike LRU, a hit does not always
//! move a line to rank 0: the promotion vector says where a line at rank `r`
//! goes, and a separate entry says where a newly filled line is inserted.
//! Every way whose rank lies between the new and the old position is pushed one
//! step toward the LRU end, so the stack remains a permutation.
//!
//! Stacks live in an arena indexed by set; a way's [`ReplacementData`] only
//! records its set and position, so an update through any way is seen by all
//! ways of that set.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()` / `reset()` / `invalidate()`: O(W)
//!   - `get_victim()`: O(C) for C candidates
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Mixed workloads where plain LRU thrashes on scans but
//!   re-referenced lines need a second chance
//! - **Worst Case:** A vector tuned for a different workload class

use tracing::{debug, trace};

use super::recency::{Rank, RecencyStack};
use super::vector::PromotionVector;
use super::{ReplacementData, ReplacementPolicy};
use crate::common::bits::require_power_of_two;
use crate::common::error::ConfigError;

/// Where a repositioned way should land.
#[derive(Clone, Copy)]
enum Placement {
    /// Look the new rank up from the current one (hit).
    Promote,
    /// Use the vector's insertion rank (fill).
    Insert,
}

/// IPV policy state: one recency stack per set plus the promotion vector.
#[derive(Debug, Clone)]
pub struct IpvPolicy {
    ways: usize,
    vector: PromotionVector,
    stacks: Vec<RecencyStack>,
    instances: usize,
}

impl IpvPolicy {
    /// Creates an empty policy for `ways`-way sets.
    ///
    /// No stacks exist until [`ReplacementPolicy::instantiate_entry`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPowerOfTwo`] if `ways` is not a non-zero power
    /// of two, or [`ConfigError::PromotionLength`] if `vector` was built for a
    /// different associativity.
    pub fn new(ways: usize, vector: PromotionVector) -> Result<Self, ConfigError> {
        let ways = require_power_of_two("ways", ways)?;
        if vector.ways() != ways {
            return Err(ConfigError::PromotionLength {
                ways,
                found: vector.entries().len(),
            });
        }
        Ok(Self {
            ways,
            vector,
            stacks: Vec::new(),
            instances: 0,
        })
    }

    /// Creates a policy and instantiates every way of `sets` sets.
    ///
    /// The returned entries are in instantiation order: set 0 ways `0..W`,
    /// then set 1, and so on.
    ///
    /// # Errors
    ///
    /// Same as [`IpvPolicy::new`].
    pub fn with_sets(
        sets: usize,
        ways: usize,
        vector: PromotionVector,
    ) -> Result<(Self, Vec<ReplacementData>), ConfigError> {
        let mut policy = Self::new(ways, vector)?;
        let entries = (0..sets * ways)
            .map(|_| policy.instantiate_entry())
            .collect();
        Ok((policy, entries))
    }

    /// Associativity.
    #[inline]
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Number of sets that have a stack.
    #[inline]
    pub fn sets(&self) -> usize {
        self.stacks.len()
    }

    /// The promotion vector in use.
    #[inline]
    pub const fn vector(&self) -> &PromotionVector {
        &self.vector
    }

    /// Recency stack of `set`, if it has been instantiated.
    pub fn stack(&self, set: usize) -> Option<&RecencyStack> {
        self.stacks.get(set)
    }

    /// Replaces the recency stack of `set`, e.g. to restore a snapshot.
    ///
    /// The ranks are not checked for consistency; see
    /// [`RecencyStack::is_consistent`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSet`] if `set` was never instantiated, or
    /// [`ConfigError::StackLength`] if `stack` does not cover exactly `W` ways.
    pub fn set_stack(&mut self, set: usize, stack: RecencyStack) -> Result<(), ConfigError> {
        let sets = self.stacks.len();
        let slot = self
            .stacks
            .get_mut(set)
            .ok_or(ConfigError::UnknownSet { set, sets })?;
        if stack.ways() != self.ways {
            return Err(ConfigError::StackLength {
                ways: self.ways,
                found: stack.ways(),
            });
        }
        *slot = stack;
        Ok(())
    }

    /// Current rank of the way described by `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` names a set this policy never instantiated.
    #[inline]
    pub fn rank(&self, data: &ReplacementData) -> Rank {
        self.stacks[data.set_id].rank(data.position)
    }

    /// Clamps a stored rank into `0..W`, noting out-of-range values.
    fn clamp(&self, data: &ReplacementData, rank: Rank) -> usize {
        if let Rank::Valid(r) = rank {
            if r >= self.ways {
                debug!(
                    set = data.set_id,
                    position = data.position,
                    rank = r,
                    "recency rank out of range, clamping to LRU"
                );
            }
        }
        rank.clamped(self.ways)
    }

    /// Moves the way at `data` to its new rank and shifts the ranks in
    /// `[new, old)` one step toward LRU.
    fn reposition(&mut self, data: &ReplacementData, placement: Placement) {
        let old = self.clamp(data, self.rank(data));
        let new = match placement {
            Placement::Promote => self.vector.promotion(old),
            Placement::Insert => self.vector.insertion(),
        };
        let ways = self.ways;
        let stack = &mut self.stacks[data.set_id];
        trace!(set = data.set_id, position = data.position, old, new, before = %stack);

        for (i, rank) in stack.ranks_mut().iter_mut().enumerate() {
            if i == data.position {
                *rank = Rank::Valid(new);
            } else {
                let r = rank.clamped(ways);
                if new <= r && r < old {
                    *rank = Rank::Valid(r + 1);
                }
            }
        }

        trace!(set = data.set_id, after = %stack);
    }
}

impl ReplacementPolicy for IpvPolicy {
    /// Hands out the next way's replacement data.
    ///
    /// Every `W` consecutive calls share one freshly created identity stack.
    fn instantiate_entry(&mut self) -> ReplacementData {
        if self.instances % self.ways == 0 {
            self.stacks.push(RecencyStack::identity(self.ways));
        }
        let data = ReplacementData {
            set_id: self.instances / self.ways,
            position: self.instances % self.ways,
        };
        self.instances += 1;
        data
    }

    /// Promotes a way on a hit according to the promotion vector.
    fn touch(&mut self, data: &ReplacementData) {
        self.reposition(data, Placement::Promote);
    }

    /// Places a freshly filled way at the insertion rank.
    fn reset(&mut self, data: &ReplacementData) {
        self.reposition(data, Placement::Insert);
    }

    /// Marks a way invalidated and closes the gap its rank leaves behind.
    ///
    /// Ranks in `(old, W]` shift down by one; larger out-of-range ranks are
    /// left as they are. A previously invalidated way is ranked as LRU for the
    /// shift, so it ends up just behind the remaining valid ways and the set
    /// keeps a single sentinel. A way that is already invalidated is left
    /// alone.
    fn invalidate(&mut self, data: &ReplacementData) {
        let current = self.rank(data);
        if current.is_invalidated() {
            trace!(set = data.set_id, position = data.position, "already invalidated");
            return;
        }
        let old = self.clamp(data, current);
        let ways = self.ways;
        let stack = &mut self.stacks[data.set_id];
        trace!(set = data.set_id, position = data.position, old, before = %stack);

        for (i, rank) in stack.ranks_mut().iter_mut().enumerate() {
            if i == data.position {
                *rank = Rank::Invalidated;
            } else {
                match *rank {
                    Rank::Valid(r) if old < r && r <= ways => *rank = Rank::Valid(r - 1),
                    Rank::Valid(_) => {}
                    // An older sentinel counts as the LRU rank and rejoins the stack.
                    Rank::Invalidated if ways - 1 > old => *rank = Rank::Valid(ways - 2),
                    Rank::Invalidated => *rank = Rank::Valid(ways - 1),
                }
            }
        }

        trace!(set = data.set_id, after = %stack);
    }

    /// Picks the way to evict.
    ///
    /// Only ways at the LRU rank or beyond (including invalidated ways) are
    /// eligible, and the eligible candidate that comes last in `candidates` is
    /// chosen. A consistent stack has exactly one eligible way, the sentinel if
    /// there is one. With no eligible candidate the first one is returned.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty.
    fn get_victim<'a>(&self, candidates: &'a [ReplacementData]) -> &'a ReplacementData {
        assert!(
            !candidates.is_empty(),
            "victim selection needs at least one candidate"
        );
        let lru = self.ways - 1;
        let victim = candidates
            .iter()
            .rev()
            .find(|c| self.rank(c).value(self.ways) >= lru)
            .unwrap_or(&candidates[0]);
        trace!(
            set = victim.set_id,
            position = victim.position,
            rank = %self.rank(victim),
            "victim"
        );
        victim
    }
}
