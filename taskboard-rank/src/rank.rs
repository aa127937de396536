//! The rank token and its comparison rule.

use crate::alphabet::{digit_of, symbol_of, ALPHABET, LOWEST};
use crate::error::{RankError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Position of a record among its siblings.
///
/// Ranks are strings over [`ALPHABET`]. They compare symbol by symbol, with
/// the shorter rank read as if right-padded with the lowest symbol, so `"a"`
/// and `"a0"` are equal and both sort before `"a1"`. Equality and hashing use
/// the same rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rank(String);

impl Rank {
    /// Parse a rank, rejecting empty input and foreign symbols
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(RankError::invalid(input, "rank is empty"));
        }
        if let Some(bad) = input.chars().find(|c| !c.is_ascii() || digit_of(*c as u8).is_none()) {
            return Err(RankError::invalid(
                input,
                format!("symbol '{}' is not in the alphabet", bad),
            ));
        }
        Ok(Self(input.to_string()))
    }

    /// Build a rank from digit values. Callers guarantee a non-empty,
    /// in-range sequence.
    pub(crate) fn from_digits(digits: &[u8]) -> Self {
        Self(digits.iter().map(|&d| symbol_of(d) as char).collect())
    }

    /// Digit values of the stored symbols
    pub(crate) fn digits(&self) -> Vec<u8> {
        self.0
            .bytes()
            .map(|b| digit_of(b).unwrap_or(LOWEST))
            .collect()
    }

    /// The stored symbol sequence
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of stored symbols
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Ranks are never empty; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The rank without trailing lowest symbols.
    ///
    /// Two ranks are equal exactly when their trimmed forms are equal, and
    /// byte order of trimmed forms matches rank order. Returns an empty
    /// string for the all-lowest rank.
    pub fn trimmed(&self) -> &str {
        self.0.trim_end_matches(ALPHABET[LOWEST as usize] as char)
    }
}

/// Compare two ranks, padding the shorter one with the lowest symbol
pub fn compare(a: &Rank, b: &Rank) -> Ordering {
    let (a, b) = (a.0.as_bytes(), b.0.as_bytes());
    let pad = ALPHABET[LOWEST as usize];
    let len = a.len().max(b.len());

    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(pad);
        let y = b.get(i).copied().unwrap_or(pad);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Parse a rank from a plain string
pub fn parse(input: &str) -> Result<Rank> {
    Rank::parse(input)
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for Rank {}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl Hash for Rank {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.trimmed().hash(state);
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Rank {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rank {
    type Error = RankError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.0
    }
}

impl AsRef<str> for Rank {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
