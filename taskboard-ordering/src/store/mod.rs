//! Storage abstraction for ranked records
//!
//! The orchestrator only ever talks to a [`RankStore`]. Every write carries
//! [`RankGuard`]s: the container and rank of each record the new rank was
//! computed from, as they were read. A store checks them inside the same
//! atomic unit as the write and refuses with
//! [`OrderingError::NeighborChanged`] if any of them moved. Stores also
//! enforce rank uniqueness among the live records of a container and report
//! violations as [`OrderingError::RankCollision`].

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::{OrderingError, Result};
use crate::types::{ContainerId, OrderedRecord, RecordId};
use async_trait::async_trait;
use taskboard_rank::Rank;

/// Container and rank of a record as read before a write
#[derive(Debug, Clone, PartialEq)]
pub struct RankGuard {
    pub id: RecordId,
    pub container: ContainerId,
    pub rank: Rank,
}

impl RankGuard {
    /// Guard on a record's current position
    pub fn of(record: &OrderedRecord) -> Self {
        Self {
            id: record.id.clone(),
            container: record.container.clone(),
            rank: record.rank.clone(),
        }
    }
}

/// New container and rank for one record
#[derive(Debug, Clone, PartialEq)]
pub struct RankChange {
    pub id: RecordId,
    pub container: ContainerId,
    pub rank: Rank,
    pub guards: Vec<RankGuard>,
}

/// Persistence for ranked records.
///
/// Each write method is atomic: it applies completely or not at all.
#[async_trait]
pub trait RankStore: Send + Sync {
    /// Read one record, including soft-deleted ones
    async fn get(&self, id: &RecordId) -> Result<OrderedRecord>;

    /// Live records of a container in ascending rank order
    async fn live_records(&self, container: &ContainerId) -> Result<Vec<OrderedRecord>>;

    /// Insert a new record
    async fn insert(&self, record: &OrderedRecord, guards: &[RankGuard]) -> Result<()>;

    /// Write a record's new container and rank together
    async fn commit_move(&self, change: &RankChange) -> Result<OrderedRecord>;

    /// Write a whole container's new ranks as one unit
    async fn apply_rebalance(&self, container: &ContainerId, changes: &[RankChange])
        -> Result<()>;

    /// Mark a record deleted. Its rank is kept.
    async fn soft_delete(&self, id: &RecordId) -> Result<OrderedRecord>;
}

/// Check a guard against the record's state at commit time
pub(crate) fn verify_guard(current: Option<&OrderedRecord>, guard: &RankGuard) -> Result<()> {
    match current {
        Some(record)
            if record.is_live()
                && record.container == guard.container
                && record.rank == guard.rank =>
        {
            Ok(())
        }
        _ => Err(OrderingError::NeighborChanged {
            id: guard.id.to_string(),
        }),
    }
}
