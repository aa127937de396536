//! Fresh, evenly spaced ranks for a whole container.

use crate::alphabet::{BASE, LOWEST, MAX_RANK_LEN};
use crate::error::{RankError, Result};
use crate::rank::Rank;
use tracing::trace;

/// Anything that carries a rank and can be rebalanced in place
pub trait Ranked {
    /// Current rank
    fn rank(&self) -> &Rank;

    /// Replace the rank
    fn set_rank(&mut self, rank: Rank);
}

impl Ranked for Rank {
    fn rank(&self) -> &Rank {
        self
    }

    fn set_rank(&mut self, rank: Rank) {
        *self = rank;
    }
}

/// `count` strictly increasing ranks spread evenly over the rank space.
///
/// Uses the shortest width that leaves a stride of at least three, so
/// adjacent ranks stay at least two apart even after a value is nudged off
/// a trailing lowest symbol. A single record gets the midpoint rank. No rank
/// ends in the lowest symbol.
pub fn spread(count: usize) -> Result<Vec<Rank>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let slots = count as u128 + 1;
    let mut width = 1;
    let mut capacity = BASE as u128;
    while capacity < 3 * slots {
        width += 1;
        if width > MAX_RANK_LEN {
            return Err(RankError::exhausted(None, None));
        }
        capacity *= BASE as u128;
    }

    let stride = capacity / slots;
    trace!(count, width, stride, "spreading ranks");

    let ranks = (1..=count as u128)
        .map(|k| {
            let mut value = stride * k;
            if value % BASE as u128 == LOWEST as u128 {
                value += 1;
            }
            Rank::from_digits(&to_digits(value, width))
        })
        .collect();

    Ok(ranks)
}

/// Reassign evenly spaced ranks to records already sorted by rank.
///
/// Equal neighbouring ranks are allowed and keep their input order, which
/// lets a rebalance repair a container that ended up with duplicates. A
/// descending pair is rejected.
pub fn rebalance<T: Ranked>(records: &mut [T]) -> Result<()> {
    if let Some(pair) = records.windows(2).find(|w| w[0].rank() > w[1].rank()) {
        return Err(RankError::out_of_order(
            pair[0].rank().as_str(),
            pair[1].rank().as_str(),
        ));
    }

    let fresh = spread(records.len())?;
    for (record, rank) in records.iter_mut().zip(fresh) {
        record.set_rank(rank);
    }
    Ok(())
}

/// Base-36 digits of `value`, most significant first, left-padded to `width`
fn to_digits(mut value: u128, width: usize) -> Vec<u8> {
    let mut digits = vec![LOWEST; width];
    for slot in digits.iter_mut().rev() {
        *slot = (value % BASE as u128) as u8;
        value /= BASE as u128;
    }
    digits
}
