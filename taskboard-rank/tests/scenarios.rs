//! Ordering scenarios exercised through the public engine API only

use taskboard_rank::{between, middle, next, parse, prev, rebalance, Rank, MAX_RANK_LEN};

#[test]
fn test_insert_into_empty_then_after_then_between() {
    let a = middle();
    assert_eq!(a.as_str(), "i");

    let b = next(&a).unwrap();
    assert!(b > a);

    let c = between(&a, &b).unwrap();
    assert!(a < c && c < b);
}

#[test]
fn test_prepend_before_first() {
    let first = middle();
    let before = prev(&first).unwrap();
    assert!(before < first);
    assert!(between(&before, &first).is_ok());
}

#[test]
fn test_exhausted_pair_recovers_after_rebalance() {
    let low = parse("i").unwrap();
    let high = parse(&format!("i{}1", "0".repeat(MAX_RANK_LEN - 2))).unwrap();
    let tail = parse("j").unwrap();

    let err = between(&low, &high).unwrap_err();
    assert!(err.is_exhausted());

    let mut container = vec![low, high, tail];
    rebalance(&mut container).unwrap();

    let mid = between(&container[0], &container[1]).unwrap();
    assert!(container[0] < mid && mid < container[1]);
    assert!(mid.len() <= 2);
}

#[test]
fn test_drag_to_front_repeatedly() {
    // Moving the last card to the front over and over keeps a consistent order
    let mut cards: Vec<Rank> = vec![middle()];
    for _ in 0..50 {
        let last = cards.last().unwrap().clone();
        cards.push(next(&last).unwrap());
    }

    for _ in 0..200 {
        cards.pop();
        let front = prev(&cards[0]).unwrap();
        cards.insert(0, front);
    }

    for pair in cards.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn test_generated_ranks_are_deterministic() {
    let run = || {
        let low = middle();
        let mut high = next(&low).unwrap();
        let mut produced = Vec::new();
        while let Ok(mid) = between(&low, &high) {
            produced.push(mid.to_string());
            high = mid;
        }
        produced
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(first.last().map(String::len), Some(MAX_RANK_LEN));
}
