//! Process-local store

use super::{verify_guard, RankChange, RankGuard, RankStore};
use crate::error::{OrderingError, Result};
use crate::types::{ContainerId, OrderedRecord, RecordId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

/// Records held in memory behind an async read-write lock.
///
/// Every write runs under the write lock and checks guards and uniqueness
/// before mutating anything.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordId, OrderedRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_guards(records: &HashMap<RecordId, OrderedRecord>, guards: &[RankGuard]) -> Result<()> {
    guards
        .iter()
        .try_for_each(|guard| verify_guard(records.get(&guard.id), guard))
}

/// Fail if a live record other than `except` holds `rank` in `container`
fn check_unique(
    records: &HashMap<RecordId, OrderedRecord>,
    container: &ContainerId,
    rank: &taskboard_rank::Rank,
    except: &RecordId,
) -> Result<()> {
    let taken = records.values().any(|r| {
        r.is_live() && &r.id != except && &r.container == container && &r.rank == rank
    });
    if taken {
        return Err(OrderingError::RankCollision {
            container: container.to_string(),
            rank: rank.to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl RankStore for MemoryStore {
    async fn get(&self, id: &RecordId) -> Result<OrderedRecord> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| OrderingError::RecordNotFound { id: id.to_string() })
    }

    async fn live_records(&self, container: &ContainerId) -> Result<Vec<OrderedRecord>> {
        let records = self.records.read().await;
        let mut live: Vec<OrderedRecord> = records
            .values()
            .filter(|r| r.is_live() && &r.container == container)
            .cloned()
            .collect();
        live.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
        Ok(live)
    }

    async fn insert(&self, record: &OrderedRecord, guards: &[RankGuard]) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(OrderingError::storage(format!(
                "record {} already exists",
                record.id
            )));
        }
        check_guards(&records, guards)?;
        check_unique(&records, &record.container, &record.rank, &record.id)?;

        debug!(id = %record.id, container = %record.container, rank = %record.rank, "inserted record");
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn commit_move(&self, change: &RankChange) -> Result<OrderedRecord> {
        let mut records = self.records.write().await;
        check_guards(&records, &change.guards)?;
        check_unique(&records, &change.container, &change.rank, &change.id)?;

        let record = records
            .get_mut(&change.id)
            .ok_or_else(|| OrderingError::RecordNotFound {
                id: change.id.to_string(),
            })?;
        if !record.is_live() {
            return Err(OrderingError::RecordDeleted {
                id: change.id.to_string(),
            });
        }

        record.container = change.container.clone();
        record.rank = change.rank.clone();
        record.updated_at = Utc::now();
        debug!(id = %record.id, container = %record.container, rank = %record.rank, "committed move");
        Ok(record.clone())
    }

    async fn apply_rebalance(
        &self,
        container: &ContainerId,
        changes: &[RankChange],
    ) -> Result<()> {
        let mut records = self.records.write().await;
        for change in changes {
            check_guards(&records, &change.guards)?;
            if !records.contains_key(&change.id) {
                return Err(OrderingError::RecordNotFound {
                    id: change.id.to_string(),
                });
            }
        }

        // Stage the final state of the container and check it before writing
        let changed: HashMap<&RecordId, &RankChange> =
            changes.iter().map(|c| (&c.id, c)).collect();
        let mut seen = HashSet::new();
        for record in records.values().filter(|r| r.is_live()) {
            let (target, rank) = match changed.get(&record.id) {
                Some(change) => (&change.container, &change.rank),
                None => (&record.container, &record.rank),
            };
            if target == container && !seen.insert(rank.clone()) {
                return Err(OrderingError::RankCollision {
                    container: container.to_string(),
                    rank: rank.to_string(),
                });
            }
        }

        let now = Utc::now();
        for change in changes {
            if let Some(record) = records.get_mut(&change.id) {
                record.container = change.container.clone();
                record.rank = change.rank.clone();
                record.updated_at = now;
            }
        }
        debug!(%container, count = changes.len(), "applied rebalance");
        Ok(())
    }

    async fn soft_delete(&self, id: &RecordId) -> Result<OrderedRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| OrderingError::RecordNotFound { id: id.to_string() })?;

        if record.deleted_at.is_none() {
            let now = Utc::now();
            record.deleted_at = Some(now);
            record.updated_at = now;
        }
        Ok(record.clone())
    }
}
