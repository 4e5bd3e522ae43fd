//! Property-based tests for the IPV recency stack.
//!
//! Random promotion vectors and random hit/fill/invalidate sequences are
//! replayed against a single set. Promotion entries never exceed the rank they
//! promote from and fills always go to the selected victim, which is how a host
//! cache drives the policy.

use proptest::prelude::*;

use ipvsim_core::{IpvPolicy, PromotionVector, Rank, ReplacementData, ReplacementPolicy};

#[derive(Debug, Clone, Copy)]
enum Op {
    Touch(usize),
    Fill,
    Invalidate(usize),
}

// Associativity and a promotion vector whose entries satisfy `promo[r] <= r`.
fn geometry_strategy() -> impl Strategy<Value = (usize, Vec<usize>)> {
    prop_oneof![Just(2usize), Just(4), Just(8), Just(16)].prop_flat_map(|ways| {
        let promotions: Vec<_> = (0..ways).map(|r| 0..=r).collect();
        (Just(ways), promotions, 0..ways).prop_map(|(ways, mut entries, insertion)| {
            entries.push(insertion);
            (ways, entries)
        })
    })
}

fn op_strategy(with_invalidate: bool) -> impl Strategy<Value = Op> {
    let kinds = if with_invalidate { 3u8 } else { 2 };
    (0..kinds, 0usize..16).prop_map(|(kind, pos)| match kind {
        0 => Op::Touch(pos),
        1 => Op::Fill,
        _ => Op::Invalidate(pos),
    })
}

fn build(ways: usize, entries: Vec<usize>) -> (IpvPolicy, Vec<ReplacementData>) {
    let vector = PromotionVector::new(entries, ways).unwrap();
    IpvPolicy::with_sets(1, ways, vector).unwrap()
}

fn apply(policy: &mut IpvPolicy, entries: &[ReplacementData], op: Op) {
    let ways = entries.len();
    match op {
        Op::Touch(pos) => policy.touch(&entries[pos % ways]),
        Op::Fill => {
            let victim = *policy.get_victim(entries);
            policy.reset(&victim);
        }
        Op::Invalidate(pos) => policy.invalidate(&entries[pos % ways]),
    }
}

fn sorted_valid(policy: &IpvPolicy) -> Vec<usize> {
    let mut ranks: Vec<usize> = policy
        .stack(0)
        .unwrap()
        .ranks()
        .iter()
        .filter_map(|rank| match rank {
            Rank::Valid(r) => Some(*r),
            Rank::Invalidated => None,
        })
        .collect();
    ranks.sort_unstable();
    ranks
}

proptest! {
    // Property: hits and fills keep the stack a permutation of 0..W
    #[test]
    fn touch_and_fill_preserve_permutation(
        (ways, entries) in geometry_strategy(),
        ops in prop::collection::vec(op_strategy(false), 0..64)
    ) {
        let (mut policy, data) = build(ways, entries);
        for op in ops {
            apply(&mut policy, &data, op);
            prop_assert_eq!(sorted_valid(&policy), (0..ways).collect::<Vec<_>>());
            prop_assert_eq!(policy.stack(0).unwrap().invalidated_count(), 0);
        }
    }

    // Property: invalidating a way of a full permutation leaves one sentinel
    // and the contiguous ranks 0..W-1
    #[test]
    fn invalidate_leaves_single_sentinel(
        (ways, entries) in geometry_strategy(),
        ops in prop::collection::vec(op_strategy(false), 0..32),
        target in 0usize..16
    ) {
        let (mut policy, data) = build(ways, entries);
        for op in ops {
            apply(&mut policy, &data, op);
        }
        let target = &data[target % ways];
        policy.invalidate(target);

        prop_assert_eq!(policy.rank(target), Rank::Invalidated);
        prop_assert_eq!(policy.stack(0).unwrap().invalidated_count(), 1);
        prop_assert_eq!(sorted_valid(&policy), (0..ways - 1).collect::<Vec<_>>());
        prop_assert_eq!(policy.get_victim(&data), target);
    }

    // Property: any mix of operations keeps ranks distinct with at most one sentinel
    #[test]
    fn mixed_sequences_stay_consistent(
        (ways, entries) in geometry_strategy(),
        ops in prop::collection::vec(op_strategy(true), 0..96)
    ) {
        let (mut policy, data) = build(ways, entries);
        for op in ops {
            apply(&mut policy, &data, op);
            let stack = policy.stack(0).unwrap();
            prop_assert!(stack.is_consistent(), "inconsistent after {:?}: {}", op, stack);
            if let Op::Invalidate(_) = op {
                prop_assert_eq!(stack.invalidated_count(), 1);
            }
            if let Some(pos) = stack.position_of(Rank::Invalidated) {
                prop_assert_eq!(policy.get_victim(&data).position(), pos);
            }
        }
    }

    // Property: the same operations from the same start give the same stack
    #[test]
    fn replay_is_deterministic(
        (ways, entries) in geometry_strategy(),
        ops in prop::collection::vec(op_strategy(true), 0..64)
    ) {
        let (mut a, data_a) = build(ways, entries.clone());
        let (mut b, data_b) = build(ways, entries);
        for &op in &ops {
            apply(&mut a, &data_a, op);
            apply(&mut b, &data_b, op);
        }
        prop_assert_eq!(a.stack(0), b.stack(0));
        prop_assert_eq!(a.get_victim(&data_a), b.get_victim(&data_b));
    }
}
