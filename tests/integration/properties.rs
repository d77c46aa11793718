use std::collections::HashSet;

use dirorder::mutation::{add_lot, move_lot, remove_lot};
use dirorder::reconcile::reconcile;
use dirorder::{CaseSensitivity, ChildEntry, Comparator, OrderRecord};
use proptest::prelude::*;
use proptest::sample::subsequence;

fn arb_order() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set("[a-z]{1,6}", 0..12).prop_map(|set| set.into_iter().collect())
}

/// A base order, a lot of new names and the distinct final positions for them.
fn arb_add_lot() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<usize>)> {
    (arb_order(), 1usize..5).prop_flat_map(|(base, count)| {
        let slots: Vec<usize> = (0..base.len() + count).collect();
        (Just(base), Just(count), subsequence(slots, count).prop_shuffle()).prop_map(
            |(base, count, indices)| {
                let added = (0..count).map(|i| format!("new-{}", i)).collect();
                (base, added, indices)
            },
        )
    })
}

fn arb_live() -> impl Strategy<Value = Vec<ChildEntry>> {
    proptest::collection::hash_set("[a-zA-Z]{1,5}", 0..10).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let len = names.len();
        proptest::collection::vec(any::<bool>(), len).prop_map(move |dirs| {
            names
                .iter()
                .zip(dirs)
                .map(|(name, is_dir)| {
                    if is_dir {
                        ChildEntry::directory(name.clone())
                    } else {
                        ChildEntry::file(name.clone())
                    }
                })
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn add_lot_then_remove_lot_restores_base((base, added, indices) in arb_add_lot()) {
        let grown = add_lot(&base, &added, &indices).unwrap();
        prop_assert_eq!(grown.len(), base.len() + added.len());
        for (name, &index) in added.iter().zip(&indices) {
            prop_assert_eq!(&grown[index], name);
        }
        prop_assert_eq!(remove_lot(&grown, &indices).unwrap(), base);
    }

    #[test]
    fn move_lot_keeps_block_contiguous_and_in_order(
        (order, picked) in arb_order().prop_flat_map(|order| {
            let positions: Vec<usize> = (0..order.len()).collect();
            let len = order.len();
            (Just(order), subsequence(positions, 0..=len).prop_shuffle())
        }),
        destination in 0usize..16,
    ) {
        let moved = move_lot(&order, &picked, destination).unwrap();

        let mut sorted = moved.clone();
        sorted.sort();
        let mut expected = order.clone();
        expected.sort();
        prop_assert_eq!(sorted, expected);

        let picked_set: HashSet<usize> = picked.iter().copied().collect();
        let block: Vec<String> = order
            .iter()
            .enumerate()
            .filter(|(i, _)| picked_set.contains(i))
            .map(|(_, name)| name.clone())
            .collect();
        let start = destination.min(order.len() - block.len());
        prop_assert_eq!(&moved[start..start + block.len()], block.as_slice());
    }

    #[test]
    fn reconciliation_is_idempotent(recorded in arb_order(), live in arb_live()) {
        let comparator = Comparator::new(CaseSensitivity::Insensitive);
        let first = reconcile(&OrderRecord::new(recorded), &live, &comparator);
        let second = reconcile(&OrderRecord::new(first.order.clone()), &live, &comparator);

        prop_assert!(!second.drifted);
        prop_assert_eq!(second.order, first.order.clone());

        let live_names: HashSet<&str> = live.iter().map(|c| c.name.as_str()).collect();
        let ordered: HashSet<&str> = first.order.iter().map(String::as_str).collect();
        prop_assert_eq!(ordered, live_names);
    }
}
