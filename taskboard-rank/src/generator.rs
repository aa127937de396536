//! Boundary ranks: first in a container, append after, prepend before.

use crate::alphabet::{HIGHEST, LOWEST, MAX_RANK_LEN, MIDPOINT};
use crate::error::{RankError, Result};
use crate::rank::Rank;
use tracing::trace;

impl Rank {
    /// Rank of the first record in an empty container
    pub fn middle() -> Self {
        Self::from_digits(&[MIDPOINT])
    }

    /// Rank for appending after `self`.
    ///
    /// Increments the last symbol; when it is already the highest symbol the
    /// midpoint symbol is appended instead.
    pub fn next(&self) -> Result<Self> {
        let mut digits = self.digits();
        match digits.last_mut() {
            Some(last) if *last < HIGHEST => *last += 1,
            _ => digits.push(MIDPOINT),
        }

        if digits.len() > MAX_RANK_LEN {
            trace!(rank = %self, "no room after rank");
            return Err(RankError::exhausted(Some(self.as_str()), None));
        }
        Ok(Self::from_digits(&digits))
    }

    /// Rank for prepending before `self`.
    ///
    /// Decrements the last significant symbol. A decrement that would leave a
    /// trailing lowest symbol keeps it and appends the midpoint symbol, so
    /// `"1"` becomes `"0i"`.
    pub fn prev(&self) -> Result<Self> {
        let mut digits = self.digits();
        digits.truncate(self.trimmed().len());

        match digits.last_mut() {
            None => {
                trace!(rank = %self, "rank is the absolute minimum");
                return Err(RankError::exhausted(None, Some(self.as_str())));
            }
            Some(last) if *last > LOWEST + 1 => *last -= 1,
            Some(last) => {
                *last = LOWEST;
                digits.push(MIDPOINT);
            }
        }

        if digits.len() > MAX_RANK_LEN {
            trace!(rank = %self, "no room before rank");
            return Err(RankError::exhausted(None, Some(self.as_str())));
        }
        Ok(Self::from_digits(&digits))
    }
}

/// Rank of the first record in an empty container
pub fn middle() -> Rank {
    Rank::middle()
}

/// Rank for appending after `rank`
pub fn next(rank: &Rank) -> Result<Rank> {
    rank.next()
}

/// Rank for prepending before `rank`
pub fn prev(rank: &Rank) -> Result<Rank> {
    rank.prev()
}
