//! Insertion/Promotion Vectors.
//!
//! An IPV for a `W`-way set has `W + 1` entries. Entry `r` (for `r < W`) is the
//! rank a way currently at rank `r` moves to when it hits; entry `W` is the rank
//! a freshly filled line is inserted at. The values are tuned offline and fed
//! to the policy as data.

use crate::common::error::ConfigError;

/// Published vector tuned for 16-way last-level caches.
pub const IPV_16WAY: [usize; 17] = [0, 0, 1, 0, 3, 0, 1, 2, 1, 0, 5, 1, 0, 0, 1, 11, 13];

/// Validated promotion vector for a fixed associativity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionVector {
    entries: Vec<usize>,
}

impl PromotionVector {
    /// Validates `entries` as a vector for `ways` ways.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PromotionLength`] unless there are exactly
    /// `ways + 1` entries, and [`ConfigError::PromotionOutOfRange`] if any
    /// entry is not a valid rank.
    pub fn new(entries: Vec<usize>, ways: usize) -> Result<Self, ConfigError> {
        if entries.len() != ways + 1 {
            return Err(ConfigError::PromotionLength {
                ways,
                found: entries.len(),
            });
        }
        if let Some((index, &value)) = entries.iter().enumerate().find(|&(_, &v)| v >= ways) {
            return Err(ConfigError::PromotionOutOfRange { index, value, ways });
        }
        Ok(Self { entries })
    }

    /// The published 16-way vector ([`IPV_16WAY`]).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PresetWays`] when `ways` is not 16.
    pub fn paper(ways: usize) -> Result<Self, ConfigError> {
        if ways != IPV_16WAY.len() - 1 {
            return Err(ConfigError::PresetWays {
                preset: "paper",
                expected: IPV_16WAY.len() - 1,
                ways,
            });
        }
        Self::new(IPV_16WAY.to_vec(), ways)
    }

    /// Classic LRU: every hit and every fill goes to rank 0.
    pub fn lru(ways: usize) -> Self {
        Self {
            entries: vec![0; ways + 1],
        }
    }

    /// LRU insertion policy: hits go to rank 0, fills land at the LRU rank.
    pub fn lip(ways: usize) -> Self {
        let mut entries = vec![0; ways + 1];
        entries[ways] = ways.saturating_sub(1);
        Self { entries }
    }

    /// Associativity this vector was built for.
    #[inline]
    pub fn ways(&self) -> usize {
        self.entries.len() - 1
    }

    /// Rank a way at `rank` is promoted to on a hit.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is not below [`PromotionVector::ways`].
    #[inline]
    pub fn promotion(&self, rank: usize) -> usize {
        assert!(rank < self.ways(), "rank {rank} outside promotion table");
        self.entries[rank]
    }

    /// Rank a newly filled line is inserted at.
    #[inline]
    pub fn insertion(&self) -> usize {
        self.entries[self.ways()]
    }

    /// Raw entries, promotion ranks first and the insertion rank last.
    #[inline]
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }
}
