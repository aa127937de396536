//! Ranks strictly between two existing ranks.

use crate::alphabet::{BASE, LOWEST, MAX_RANK_LEN};
use crate::error::{RankError, Result};
use crate::rank::Rank;
use tracing::trace;

impl Rank {
    /// A rank strictly between `low` and `high`.
    ///
    /// Walks both ranks symbol by symbol. A missing symbol in `low` reads as
    /// the lowest symbol. While the produced prefix still matches `high`,
    /// `high`'s symbol bounds the position; after the prefix drops below
    /// `high` the bound is one past the highest symbol. The first position
    /// whose integer midpoint exceeds `low`'s symbol ends the walk; earlier
    /// positions copy `low`'s symbol.
    ///
    /// Fails with [`RankError::Exhausted`] when no such position exists
    /// within [`MAX_RANK_LEN`], and with [`RankError::OutOfOrder`] unless
    /// `low < high`.
    pub fn between(low: &Rank, high: &Rank) -> Result<Rank> {
        if low >= high {
            return Err(RankError::out_of_order(low.as_str(), high.as_str()));
        }

        let low_digits = low.digits();
        let high_digits = high.digits();
        let mut result = Vec::with_capacity(MAX_RANK_LEN);
        let mut bounded = true;

        for i in 0..MAX_RANK_LEN {
            let lo = low_digits.get(i).copied().unwrap_or(LOWEST);
            let hi = if bounded {
                high_digits.get(i).copied().unwrap_or(LOWEST)
            } else {
                BASE
            };

            let mid = (lo + hi) / 2;
            if mid > lo {
                result.push(mid);
                return Ok(Rank::from_digits(&result));
            }

            result.push(lo);
            if hi > lo {
                bounded = false;
            }
        }

        trace!(%low, %high, "no room between ranks");
        Err(RankError::exhausted(Some(low.as_str()), Some(high.as_str())))
    }
}

/// A rank strictly between `low` and `high`
pub fn between(low: &Rank, high: &Rank) -> Result<Rank> {
    Rank::between(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn r(s: &str) -> Rank {
        Rank::parse(s).unwrap()
    }

    #[rstest]
    #[case("a", "c", "b")]
    #[case("a", "b", "ai")]
    #[case("i", "i1", "i0i")]
    #[case("a0", "a1", "a0i")]
    #[case("y", "z", "yi")]
    #[case("yz", "z", "yzi")]
    #[case("0", "1", "0i")]
    #[case("a", "z", "m")]
    fn test_between(#[case] low: &str, #[case] high: &str, #[case] expected: &str) {
        let mid = Rank::between(&r(low), &r(high)).unwrap();
        assert_eq!(mid.as_str(), expected);
        assert!(r(low) < mid && mid < r(high));
    }

    #[rstest]
    #[case("b", "a")]
    #[case("a", "a")]
    #[case("a", "a00")]
    fn test_between_out_of_order(#[case] low: &str, #[case] high: &str) {
        let err = Rank::between(&r(low), &r(high)).unwrap_err();
        assert!(matches!(err, RankError::OutOfOrder { .. }));
    }

    #[test]
    fn test_between_never_ends_in_lowest_symbol() {
        let low = r("a");
        let mut high = r("b");
        for _ in 0..40 {
            let mid = Rank::between(&low, &high).unwrap();
            assert!(!mid.as_str().ends_with('0'), "{mid}");
            high = mid;
        }
    }

    #[test]
    fn test_minimum_spacing_is_exhausted() {
        let low = r("i");
        let high = r(&format!("i{}1", "0".repeat(MAX_RANK_LEN - 2)));
        assert_eq!(high.len(), MAX_RANK_LEN);

        let err = Rank::between(&low, &high).unwrap_err();
        assert!(err.is_exhausted());
    }

    #[test]
    fn test_halving_exhausts_at_max_length() {
        let low = r("i");
        let mut high = r("j");
        let mut last_ok = high.clone();

        let err = loop {
            match Rank::between(&low, &high) {
                Ok(mid) => {
                    assert!(low < mid && mid < high);
                    last_ok = mid.clone();
                    high = mid;
                }
                Err(err) => break err,
            }
        };

        assert!(err.is_exhausted());
        assert_eq!(last_ok.len(), MAX_RANK_LEN);
    }

    #[test]
    fn test_halving_upwards_stays_ordered() {
        let mut low = r("i");
        let high = r("j");
        for _ in 0..60 {
            let mid = Rank::between(&low, &high).unwrap();
            assert!(low < mid && mid < high);
            low = mid;
        }
    }
}
