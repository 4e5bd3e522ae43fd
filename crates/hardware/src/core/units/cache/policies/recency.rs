//! Recency ranks and the per-set recency stack.
//!
//! A recency stack holds one [`Rank`] per way of a set, indexed by the way's
//! position. Rank 0 is the most recently useful way and rank `W-1` the least.
//! In steady state the valid ranks form a permutation of `0..W`. Invalidating a
//! way replaces its rank with [`Rank::Invalidated`], which sorts above every
//! valid rank and therefore marks the way as the first to be evicted.

use std::fmt;

/// Recency rank of a single way.
///
/// The derived ordering places every `Valid` rank below `Invalidated`, which is
/// exactly the eviction priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    /// Live line at the given recency position (0 = MRU).
    Valid(usize),
    /// Line whose contents were invalidated; highest eviction priority.
    Invalidated,
}

impl Rank {
    /// Numeric view of the rank for a set of `ways` ways.
    ///
    /// `Invalidated` maps to `ways`, one past the LRU position.
    #[inline]
    pub const fn value(self, ways: usize) -> usize {
        match self {
            Self::Valid(r) => r,
            Self::Invalidated => ways,
        }
    }

    /// Rank value clamped into the valid range `0..ways`.
    #[inline]
    pub const fn clamped(self, ways: usize) -> usize {
        match self {
            Self::Valid(r) if r < ways => r,
            _ => ways - 1,
        }
    }

    /// Returns `true` for [`Rank::Invalidated`].
    #[inline]
    pub const fn is_invalidated(self) -> bool {
        matches!(self, Self::Invalidated)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(r) => write!(f, "{r}"),
            Self::Invalidated => f.write_str("inv"),
        }
    }
}

/// Per-set recency stack shared by all ways of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyStack {
    ranks: Vec<Rank>,
}

impl RecencyStack {
    /// Creates a stack holding the identity permutation `[0, 1, ..., ways-1]`.
    pub fn identity(ways: usize) -> Self {
        Self {
            ranks: (0..ways).map(Rank::Valid).collect(),
        }
    }

    /// Creates a stack from explicit ranks, without checking consistency.
    ///
    /// Useful for restoring a snapshot or setting up a specific state; call
    /// [`RecencyStack::is_consistent`] if the input is untrusted.
    pub const fn from_ranks(ranks: Vec<Rank>) -> Self {
        Self { ranks }
    }

    /// Creates a stack from numeric ranks, mapping `ways` (or more) to
    /// [`Rank::Invalidated`] the way a raw sentinel encoding would.
    pub fn from_values(values: &[usize]) -> Self {
        let ways = values.len();
        Self {
            ranks: values
                .iter()
                .map(|&v| if v >= ways { Rank::Invalidated } else { Rank::Valid(v) })
                .collect(),
        }
    }

    /// Number of ways covered by this stack.
    #[inline]
    pub fn ways(&self) -> usize {
        self.ranks.len()
    }

    /// Rank of the way at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the set.
    #[inline]
    pub fn rank(&self, position: usize) -> Rank {
        self.ranks[position]
    }

    /// All ranks, indexed by way position.
    #[inline]
    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    pub(crate) fn ranks_mut(&mut self) -> &mut [Rank] {
        &mut self.ranks
    }

    /// Numeric view of the stack (`Invalidated` shown as `ways`).
    pub fn values(&self) -> Vec<usize> {
        let ways = self.ways();
        self.ranks.iter().map(|r| r.value(ways)).collect()
    }

    /// Position of the way currently holding `rank`, if any.
    pub fn position_of(&self, rank: Rank) -> Option<usize> {
        self.ranks.iter().position(|&r| r == rank)
    }

    /// Number of ways currently marked invalidated.
    pub fn invalidated_count(&self) -> usize {
        self.ranks.iter().filter(|r| r.is_invalidated()).count()
    }

    /// Checks the stack invariant.
    ///
    /// Valid ranks must be distinct and below `ways`. At most one way may be
    /// invalidated, and it stands in for the LRU rank, so no valid way may
    /// hold `ways - 1` alongside it. Reading the invalidated way as LRU, a
    /// consistent stack is always a permutation of `0..ways`.
    pub fn is_consistent(&self) -> bool {
        let ways = self.ways();
        let mut seen = vec![false; ways];
        let mut invalidated = 0;
        for rank in &self.ranks {
            match *rank {
                Rank::Invalidated => invalidated += 1,
                Rank::Valid(r) if r < ways && !seen[r] => seen[r] = true,
                Rank::Valid(_) => return false,
            }
        }
        match invalidated {
            0 => true,
            1 => !seen[ways - 1],
            _ => false,
        }
    }
}

impl fmt::Display for RecencyStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, rank) in self.ranks.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{rank}")?;
        }
        f.write_str("]")
    }
}
