//! IPV Replacement Policy Tests.
//!
//! Verifies touch, reset, invalidate and victim selection on hand-built
//! recency stacks. Stacks are written as numeric ranks per way position, with
//! `W` standing for an invalidated way.

use pretty_assertions::assert_eq;
use rstest::rstest;

use ipvsim_core::common::ConfigError;
use ipvsim_core::core::units::cache::policies::IPV_16WAY;
use ipvsim_core::{IpvPolicy, PromotionVector, Rank, RecencyStack, ReplacementPolicy};

use crate::common::{policy_with, values};

/// 4-way vector: rank 2 promotes to 1, rank 3 to 0, insertion at 1.
const VEC4: [usize; 5] = [0, 0, 1, 0, 1];

// ══════════════════════════════════════════════════════════
// 1. Instantiation
// ══════════════════════════════════════════════════════════

/// Every group of W instantiations shares one identity stack, positions wrap.
#[test]
fn instantiation_creates_one_identity_stack_per_set() {
    let mut policy = IpvPolicy::new(4, PromotionVector::lru(4)).unwrap();
    let entries: Vec<_> = (0..12).map(|_| policy.instantiate_entry()).collect();

    assert_eq!(policy.sets(), 3);
    for (i, data) in entries.iter().enumerate() {
        assert_eq!(data.set_id(), i / 4);
        assert_eq!(data.position(), i % 4);
        assert_eq!(policy.rank(data), Rank::Valid(i % 4));
    }
}

/// Construction refuses associativities that are not powers of two.
#[rstest]
#[case(0)]
#[case(3)]
#[case(12)]
fn rejects_bad_associativity(#[case] ways: usize) {
    let err = IpvPolicy::new(ways, PromotionVector::lru(4)).unwrap_err();
    assert_eq!(err, ConfigError::NotPowerOfTwo { what: "ways", value: ways });
}

/// Updates through one set never leak into another.
#[test]
fn sets_are_independent() {
    let (mut policy, entries) = IpvPolicy::with_sets(2, 4, PromotionVector::lru(4)).unwrap();
    policy.touch(&entries[7]);
    policy.invalidate(&entries[4]);

    assert_eq!(policy.stack(0).unwrap().values(), vec![0, 1, 2, 3]);
    assert_eq!(policy.stack(1).unwrap().values(), vec![4, 1, 2, 0]);
}

/// Replacing a stack is checked against the set count and associativity.
#[test]
fn set_stack_validates_shape() {
    let (mut p, _) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    assert_eq!(
        p.set_stack(0, RecencyStack::identity(8)),
        Err(ConfigError::StackLength { ways: 4, found: 8 })
    );
    assert_eq!(
        p.set_stack(1, RecencyStack::identity(4)),
        Err(ConfigError::UnknownSet { set: 1, sets: 1 })
    );
    assert_eq!(values(&p), vec![0, 1, 2, 3]);

    p.set_stack(0, RecencyStack::from_values(&[3, 2, 1, 0])).unwrap();
    assert_eq!(values(&p), vec![3, 2, 1, 0]);
}

// ══════════════════════════════════════════════════════════
// 2. Touch
// ══════════════════════════════════════════════════════════

/// Rank 2 promotes to 1; the way at rank 1 is displaced to 2.
#[test]
fn touch_promotes_and_displaces() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.touch(&e[2]);
    assert_eq!(values(&p), vec![0, 2, 1, 3]);
}

/// With the all-zero vector a touch is move-to-front.
#[rstest]
#[case(0, vec![0, 1, 2, 3])]
#[case(1, vec![1, 0, 2, 3])]
#[case(2, vec![1, 2, 0, 3])]
#[case(3, vec![1, 2, 3, 0])]
fn lru_vector_touch_moves_to_front(#[case] position: usize, #[case] expected: Vec<usize>) {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], vec![0; 5]);
    p.touch(&e[position]);
    assert_eq!(values(&p), expected);
}

/// A vector that demotes leaves the other ways where they are.
#[test]
fn demotion_moves_only_the_touched_way() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], vec![2, 0, 1, 0, 0]);
    p.touch(&e[0]);
    assert_eq!(values(&p), vec![2, 1, 2, 3]);
}

/// Touching an invalidated way treats it as the LRU way.
#[test]
fn touch_of_invalidated_way_starts_from_lru() {
    let (mut p, e) = policy_with(&[0, 4, 1, 2], VEC4.to_vec());
    p.touch(&e[1]);
    assert_eq!(values(&p), vec![1, 0, 2, 3]);
}

/// Paper vector: rank 0 is a fixed point, rank 2 climbs 2 -> 1 -> 0.
#[test]
fn paper_vector_fixed_points() {
    let identity: Vec<usize> = (0..16).collect();
    let (mut p, e) = policy_with(&identity, IPV_16WAY.to_vec());

    p.touch(&e[0]);
    p.touch(&e[0]);
    assert_eq!(values(&p), identity);

    p.touch(&e[2]);
    assert_eq!(p.rank(&e[2]), Rank::Valid(1));
    p.touch(&e[2]);
    assert_eq!(p.rank(&e[2]), Rank::Valid(0));
    p.touch(&e[2]);
    assert_eq!(p.rank(&e[2]), Rank::Valid(0));

    let mut expected = identity;
    expected[0] = 1;
    expected[1] = 2;
    expected[2] = 0;
    assert_eq!(values(&p), expected);
}

// ══════════════════════════════════════════════════════════
// 3. Reset
// ══════════════════════════════════════════════════════════

/// Insertion at rank 1 from rank 3 displaces ranks 1 and 2.
#[test]
fn reset_inserts_at_insertion_rank() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.reset(&e[3]);
    assert_eq!(values(&p), vec![0, 2, 3, 1]);
}

/// Refilling an invalidated way restores a full permutation.
#[test]
fn reset_of_invalidated_way_restores_permutation() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.invalidate(&e[0]);
    assert_eq!(values(&p), vec![4, 0, 1, 2]);

    p.reset(&e[0]);
    assert_eq!(values(&p), vec![1, 0, 2, 3]);
    assert!(p.stack(0).unwrap().is_consistent());
    assert_eq!(p.stack(0).unwrap().invalidated_count(), 0);
}

// ══════════════════════════════════════════════════════════
// 4. Invalidate
// ══════════════════════════════════════════════════════════

/// The invalidated way takes the sentinel and the ranks above it close up.
#[test]
fn invalidate_closes_the_gap() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.invalidate(&e[1]);

    assert_eq!(values(&p), vec![0, 4, 1, 2]);
    assert_eq!(p.rank(&e[1]), Rank::Invalidated);
    assert_eq!(p.stack(0).unwrap().position_of(Rank::Invalidated), Some(1));
}

/// A second invalidation returns the older sentinel to the valid ranks,
/// directly behind the remaining valid ways.
#[test]
fn second_invalidation_keeps_one_sentinel() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.invalidate(&e[1]);
    p.invalidate(&e[3]);

    assert_eq!(values(&p), vec![0, 2, 1, 4]);
    let stack = p.stack(0).unwrap();
    assert_eq!(stack.invalidated_count(), 1);
    assert!(stack.is_consistent());
}

/// Invalidating the same way twice changes nothing the second time.
#[test]
fn repeated_invalidation_is_idempotent() {
    let (mut p, e) = policy_with(&[3, 1, 0, 2], VEC4.to_vec());
    p.invalidate(&e[2]);
    let once = values(&p);
    p.invalidate(&e[2]);
    assert_eq!(values(&p), once);
    assert_eq!(once, vec![2, 0, 4, 1]);
}

/// Invalidating every way in turn ranks them in invalidation order.
#[test]
fn invalidating_a_whole_set_stays_consistent() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    for (i, data) in e.iter().enumerate() {
        p.invalidate(data);
        let stack = p.stack(0).unwrap();
        assert!(stack.is_consistent(), "after invalidating way {i}: {stack}");
        assert_eq!(stack.invalidated_count(), 1);
    }
    assert_eq!(values(&p), vec![0, 1, 2, 4]);
    assert_eq!(p.get_victim(&e).position(), 3);
}

/// Ranks beyond the sentinel value are left untouched by the shift.
#[test]
fn invalidate_keeps_far_out_of_range_rank() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.set_stack(
        0,
        RecencyStack::from_ranks(vec![
            Rank::Valid(0),
            Rank::Valid(1),
            Rank::Valid(2),
            Rank::Valid(9),
        ]),
    )
    .unwrap();
    p.invalidate(&e[1]);
    assert_eq!(
        p.stack(0).unwrap().ranks(),
        &[Rank::Valid(0), Rank::Invalidated, Rank::Valid(1), Rank::Valid(9)]
    );
}

/// A stack with the sentinel's numeric value is shifted down like any other.
#[test]
fn invalidate_shifts_rank_equal_to_ways() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.set_stack(
        0,
        RecencyStack::from_ranks(vec![
            Rank::Valid(0),
            Rank::Valid(1),
            Rank::Valid(2),
            Rank::Valid(4),
        ]),
    )
    .unwrap();
    p.invalidate(&e[1]);
    assert_eq!(
        p.stack(0).unwrap().ranks(),
        &[Rank::Valid(0), Rank::Invalidated, Rank::Valid(1), Rank::Valid(3)]
    );
}

// ══════════════════════════════════════════════════════════
// 5. Victim selection
// ══════════════════════════════════════════════════════════

/// The way at rank W-1 is the victim.
#[test]
fn victim_is_lru_way() {
    let (p, e) = policy_with(&[2, 0, 3, 1], VEC4.to_vec());
    assert_eq!(p.get_victim(&e).position(), 2);
}

/// An invalidated way outranks the LRU way.
#[test]
fn victim_prefers_invalidated_way() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.invalidate(&e[0]);
    assert_eq!(p.get_victim(&e).position(), 0);
}

/// Among equal ranks the candidate listed last wins.
#[test]
fn victim_ties_go_to_the_last_candidate() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    p.set_stack(0, RecencyStack::from_values(&[3, 0, 1, 3])).unwrap();

    assert_eq!(p.get_victim(&e).position(), 3);

    let reversed: Vec<_> = e.iter().rev().copied().collect();
    assert_eq!(p.get_victim(&reversed).position(), 0);
}

/// The last eligible candidate wins even when an earlier one ranks higher.
#[test]
fn victim_is_the_last_eligible_candidate() {
    let (mut p, e) = policy_with(&[4, 0, 1, 3], VEC4.to_vec());
    assert_eq!(p.rank(&e[0]), Rank::Invalidated);
    assert_eq!(p.get_victim(&e).position(), 3);

    let reversed: Vec<_> = e.iter().rev().copied().collect();
    assert_eq!(p.get_victim(&reversed).position(), 0);

    p.set_stack(
        0,
        RecencyStack::from_ranks(vec![
            Rank::Valid(9),
            Rank::Valid(0),
            Rank::Valid(1),
            Rank::Valid(3),
        ]),
    )
    .unwrap();
    assert_eq!(p.get_victim(&e).position(), 3);
}

/// With no eligible candidate the first one is returned.
#[test]
fn victim_falls_back_to_first_candidate() {
    let (p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());
    assert_eq!(p.get_victim(&e[1..3]).position(), 1);
}

/// Victim selection is pure and repeatable.
#[test]
fn victim_selection_is_deterministic() {
    let (p, e) = policy_with(&[1, 3, 0, 2], VEC4.to_vec());
    let before = values(&p);
    let first = *p.get_victim(&e);
    for _ in 0..8 {
        assert_eq!(*p.get_victim(&e), first);
    }
    assert_eq!(values(&p), before);
}

// ══════════════════════════════════════════════════════════
// 6. Hit/miss sequences
// ══════════════════════════════════════════════════════════

/// Replays the host cache protocol on a single 4-way set.
#[test]
fn miss_fill_sequence_follows_vector() {
    let (mut p, e) = policy_with(&[0, 1, 2, 3], VEC4.to_vec());

    // miss: victim is way 3, inserted at rank 1
    let victim = *p.get_victim(&e);
    assert_eq!(victim.position(), 3);
    p.reset(&victim);
    assert_eq!(values(&p), vec![0, 2, 3, 1]);

    // miss: way 2 now holds LRU
    let victim = *p.get_victim(&e);
    assert_eq!(victim.position(), 2);
    p.reset(&victim);
    assert_eq!(values(&p), vec![0, 3, 1, 2]);

    // hit on way 1 (rank 3) promotes it to 0
    p.touch(&e[1]);
    assert_eq!(values(&p), vec![1, 0, 2, 3]);
    assert_eq!(p.get_victim(&e).position(), 3);
}
