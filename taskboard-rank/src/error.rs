//! Error types for the rank engine

use thiserror::Error;

/// Result type for rank operations
pub type Result<T> = std::result::Result<T, RankError>;

/// Errors that can occur while parsing or generating ranks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    /// Input is empty or contains a symbol outside the alphabet
    #[error("invalid rank '{input}': {reason}")]
    InvalidRank { input: String, reason: String },

    /// No strict result fits within the maximum rank length
    #[error("rank space exhausted between {low} and {high} (max length {max_len})")]
    Exhausted {
        low: String,
        high: String,
        max_len: usize,
    },

    /// Bounds are not strictly ascending
    #[error("ranks out of order: '{low}' is not below '{high}'")]
    OutOfOrder { low: String, high: String },
}

impl RankError {
    /// Create an invalid rank error
    pub fn invalid(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRank {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an exhaustion error. Open bounds are shown as `-` and `+`.
    pub fn exhausted(low: Option<&str>, high: Option<&str>) -> Self {
        Self::Exhausted {
            low: low.unwrap_or("-").to_string(),
            high: high.unwrap_or("+").to_string(),
            max_len: crate::alphabet::MAX_RANK_LEN,
        }
    }

    /// Create an out-of-order error
    pub fn out_of_order(low: impl Into<String>, high: impl Into<String>) -> Self {
        Self::OutOfOrder {
            low: low.into(),
            high: high.into(),
        }
    }

    /// True when the container must be rebalanced before retrying
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
