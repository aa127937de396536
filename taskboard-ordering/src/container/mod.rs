//! Container commands

mod rebalance;

pub use rebalance::RebalanceContainer;
