//! Property-based tests for rank comparison, generation and interpolation

use proptest::prelude::*;
use std::cmp::Ordering;
use taskboard_rank::{compare, rebalance, Rank, RankError, Ranked, MAX_RANK_LEN};

fn rank_strategy() -> impl Strategy<Value = Rank> {
    "[0-9a-z]{1,12}".prop_map(|s| Rank::parse(&s).unwrap())
}

proptest! {
    /// Property: comparison is antisymmetric and reflexive
    #[test]
    fn test_compare_is_antisymmetric(a in rank_strategy(), b in rank_strategy()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        prop_assert_eq!(compare(&a, &a), Ordering::Equal);
    }

    /// Property: comparison agrees with byte order of the trimmed forms
    #[test]
    fn test_compare_matches_trimmed_order(a in rank_strategy(), b in rank_strategy()) {
        prop_assert_eq!(compare(&a, &b), a.trimmed().cmp(b.trimmed()));
    }

    /// Property: between is strictly inside its bounds or reports exhaustion
    #[test]
    fn test_between_is_strict(a in rank_strategy(), b in rank_strategy()) {
        prop_assume!(a != b);
        let (low, high) = if a < b { (a, b) } else { (b, a) };

        match Rank::between(&low, &high) {
            Ok(mid) => {
                prop_assert!(low < mid, "{} !< {}", low, mid);
                prop_assert!(mid < high, "{} !< {}", mid, high);
                prop_assert!(mid.len() <= MAX_RANK_LEN);
                prop_assert!(!mid.as_str().ends_with('0'));
            }
            Err(err) => {
                let is_exhausted = matches!(err, RankError::Exhausted { .. });
                prop_assert!(is_exhausted);
            }
        }
    }

    /// Property: next and prev move strictly in their direction
    #[test]
    fn test_next_and_prev_are_strict(a in rank_strategy()) {
        if let Ok(next) = a.next() {
            prop_assert!(next > a);
        }
        if let Ok(prev) = a.prev() {
            prop_assert!(prev < a);
        }
    }

    /// Property: rebalance keeps the order of a sorted container
    #[test]
    fn test_rebalance_keeps_order(mut ranks in prop::collection::vec(rank_strategy(), 0..200)) {
        ranks.sort();
        let mut items: Vec<Item> = ranks
            .into_iter()
            .enumerate()
            .map(|(id, rank)| Item { id, rank })
            .collect();

        rebalance(&mut items).unwrap();

        for (position, item) in items.iter().enumerate() {
            prop_assert_eq!(item.id, position);
        }
        for pair in items.windows(2) {
            prop_assert!(pair[0].rank < pair[1].rank);
        }
    }
}

struct Item {
    id: usize,
    rank: Rank,
}

impl Ranked for Item {
    fn rank(&self) -> &Rank {
        &self.rank
    }

    fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }
}
