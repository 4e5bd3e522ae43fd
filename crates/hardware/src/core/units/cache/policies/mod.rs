//! Cache Replacement Policies.
//!
//! Implements victim selection and recency bookkeeping for set-associative caches.
//!
//! # Policies
//!
//! - `Ipv`: Insertion/Promotion Vector recency stack. Classic LRU and LIP are
//!   expressed as particular promotion vectors ([`PromotionVector::lru`],
//!   [`PromotionVector::lip`]).

/// Insertion/Promotion Vector replacement policy.
pub mod ipv;

/// Recency ranks and per-set recency stacks.
pub mod recency;

/// Promotion vector definition and presets.
pub mod vector;

pub use ipv::IpvPolicy;
pub use recency::{Rank, RecencyStack};
pub use vector::{IPV_16WAY, PromotionVector};

/// Per-way replacement record.
///
/// Identifies the set a way belongs to and the way's fixed position in that
/// set's recency stack. Handed out once by
/// [`ReplacementPolicy::instantiate_entry`] and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplacementData {
    set_id: usize,
    position: usize,
}

impl ReplacementData {
    /// Creates a record for way `position` of set `set_id`.
    pub const fn new(set_id: usize, position: usize) -> Self {
        Self { set_id, position }
    }

    /// Set this way belongs to.
    #[inline]
    pub const fn set_id(&self) -> usize {
        self.set_id
    }

    /// Position of this way in its set's recency stack.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Trait for cache replacement policies.
///
/// The host cache creates one [`ReplacementData`] per way at construction time
/// and then reports every hit, fill and invalidation through it. On a miss it
/// asks the policy to choose a victim among the ways of the target set.
pub trait ReplacementPolicy: Send + Sync {
    /// Creates the replacement record for the next way.
    ///
    /// Called once per way, set by set, while the cache is built.
    fn instantiate_entry(&mut self) -> ReplacementData;

    /// Updates the policy state when a way hits.
    ///
    /// # Arguments
    ///
    /// * `data` - Replacement record of the way that was accessed.
    fn touch(&mut self, data: &ReplacementData);

    /// Updates the policy state when a way is filled after a miss.
    ///
    /// # Arguments
    ///
    /// * `data` - Replacement record of the way that was filled.
    fn reset(&mut self, data: &ReplacementData);

    /// Updates the policy state when a way's contents are invalidated.
    ///
    /// # Arguments
    ///
    /// * `data` - Replacement record of the way that was invalidated.
    fn invalidate(&mut self, data: &ReplacementData);

    /// Selects the victim among `candidates`.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Replacement records of the ways of one set; must not
    ///   be empty.
    ///
    /// # Returns
    ///
    /// The candidate to evict. The policy state is not modified.
    fn get_victim<'a>(&self, candidates: &'a [ReplacementData]) -> &'a ReplacementData;
}
