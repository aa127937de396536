//! Fractional-indexing ranks for ordering sibling records
//!
//! Lists on a board, cards in a list and items in a checklist each carry a
//! [`Rank`]: a short string over a fixed base-36 alphabet. Sorting by rank
//! gives display order, and a record can be placed anywhere by computing one
//! new rank, without touching its siblings.
//!
//! ## Overview
//!
//! - [`Rank::middle`] - rank of the first record in an empty container
//! - [`Rank::next`] / [`Rank::prev`] - append after, prepend before
//! - [`Rank::between`] - insert between two neighbours
//! - [`rebalance`] / [`spread`] - evenly spaced fresh ranks once the space
//!   between two neighbours runs out
//!
//! Everything here is a pure function. Locking, storage and retries belong
//! to the caller.
//!
//! ## Basic Usage
//!
//! ```rust
//! use taskboard_rank::Rank;
//!
//! # fn example() -> taskboard_rank::Result<()> {
//! let first = Rank::middle();
//! let second = first.next()?;
//! let inserted = Rank::between(&first, &second)?;
//!
//! assert!(first < inserted && inserted < second);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Exhaustion
//!
//! Ranks never grow past [`MAX_RANK_LEN`] symbols. When no strict result
//! fits, the generators return [`RankError::Exhausted`]; the caller
//! rebalances the container and computes the rank again.

pub mod alphabet;
mod error;
mod generator;
mod interpolate;
mod rank;
mod rebalance;

pub use alphabet::{ALPHABET, MAX_RANK_LEN};
pub use error::{RankError, Result};
pub use generator::{middle, next, prev};
pub use interpolate::between;
pub use rank::{compare, parse, Rank};
pub use rebalance::{rebalance, spread, Ranked};
