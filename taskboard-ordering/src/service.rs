//! Move orchestration
//!
//! [`OrderingService`] turns "put this record between these neighbours" into
//! a rank, and persists it. Each create, move and rebalance holds the lease of
//! every container it touches while it reads neighbours, computes the rank
//! and writes, and every write carries guards on the records the rank was
//! derived from.

use crate::config::OrderingConfig;
use crate::error::{OrderingError, Result};
use crate::locks::ContainerLocks;
use crate::store::{MemoryStore, RankChange, RankGuard, RankStore, SqliteStore};
use crate::types::{ContainerId, OrderedRecord, RecordId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskboard_rank::Rank;
use tracing::{debug, info, warn};

/// Where a record should land, named by its neighbours in the target
/// container.
///
/// `before` is the record that will precede it, `after` the record that will
/// follow it. With neither, the record goes to the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<RecordId>,
}

impl Placement {
    /// At the end of the container
    pub fn end() -> Self {
        Self::default()
    }

    /// Directly after `record`, which must be the last one
    pub fn following(record: impl Into<RecordId>) -> Self {
        Self {
            before: Some(record.into()),
            after: None,
        }
    }

    /// Directly before `record`, which must be the first one
    pub fn preceding(record: impl Into<RecordId>) -> Self {
        Self {
            before: None,
            after: Some(record.into()),
        }
    }

    /// Between two adjacent records
    pub fn between(before: impl Into<RecordId>, after: impl Into<RecordId>) -> Self {
        Self {
            before: Some(before.into()),
            after: Some(after.into()),
        }
    }
}

/// Request to move one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub id: RecordId,
    /// Target container. `None` keeps the record in the container it is in
    /// when the move takes its lease.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ContainerId>,
    #[serde(default)]
    pub placement: Placement,
}

impl MoveRequest {
    pub fn new(id: impl Into<RecordId>, target: impl Into<ContainerId>, placement: Placement) -> Self {
        Self {
            id: id.into(),
            target: Some(target.into()),
            placement,
        }
    }

    /// Move within the record's current container
    pub fn in_place(id: impl Into<RecordId>, placement: Placement) -> Self {
        Self {
            id: id.into(),
            target: None,
            placement,
        }
    }
}

/// Result of a move
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    /// The record after the move
    pub record: OrderedRecord,
    /// False when the move was a no-op and nothing was written
    pub moved: bool,
}

/// A computed rank and the guards it depends on
struct Resolved {
    rank: Rank,
    guards: Vec<RankGuard>,
    rebalanced: bool,
}

/// Places, moves and rebalances ranked records
pub struct OrderingService {
    store: Arc<dyn RankStore>,
    locks: ContainerLocks,
    config: OrderingConfig,
}

impl OrderingService {
    /// Create a service over an existing store
    pub fn new(store: Arc<dyn RankStore>, config: OrderingConfig) -> Self {
        Self {
            store,
            locks: ContainerLocks::new(config.lock_timeout()),
            config,
        }
    }

    /// Create a service with the store the config selects
    pub fn open(config: OrderingConfig) -> Result<Self> {
        let store: Arc<dyn RankStore> = match &config.database {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(store, config))
    }

    /// In-memory service with default settings
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), OrderingConfig::default())
    }

    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RankStore> {
        &self.store
    }

    pub fn locks(&self) -> &ContainerLocks {
        &self.locks
    }

    /// Append a new record to the end of a container
    pub async fn create(&self, container: &ContainerId) -> Result<OrderedRecord> {
        self.create_at(container, &Placement::end()).await
    }

    /// Insert a new record at an explicit position
    pub async fn create_at(
        &self,
        container: &ContainerId,
        placement: &Placement,
    ) -> Result<OrderedRecord> {
        let _lease = self.locks.acquire_move(&[container]).await?;

        let resolved = self.place(container, placement, None).await?;
        let record = OrderedRecord::new(container.clone(), resolved.rank);
        self.store.insert(&record, &resolved.guards).await?;

        info!(id = %record.id, %container, rank = %record.rank, "created record");
        Ok(record)
    }

    /// Move a record next to the given neighbours, possibly into another
    /// container.
    ///
    /// Container and rank are written together. If the computed rank equals
    /// the current one in the same container, nothing is written. Without a
    /// target the record stays in its current container, read under the
    /// lease.
    pub async fn move_record(&self, request: &MoveRequest) -> Result<MoveOutcome> {
        let current = self.live_record(&request.id).await?;
        let source = current.container.clone();
        let target = request.target.clone().unwrap_or_else(|| source.clone());
        let _lease = self.locks.acquire_move(&[&source, &target]).await?;

        // The record may have moved while we waited for the lease
        let mut current = self.live_record(&request.id).await?;
        if current.container != source {
            return Err(OrderingError::NeighborChanged {
                id: request.id.to_string(),
            });
        }

        let resolved = self
            .place(&target, &request.placement, Some(&request.id))
            .await?;
        if resolved.rebalanced {
            current = self.live_record(&request.id).await?;
        }

        if current.container == target && current.rank == resolved.rank {
            debug!(id = %current.id, rank = %current.rank, "move is a no-op");
            return Ok(MoveOutcome {
                record: current,
                moved: false,
            });
        }

        let mut guards = resolved.guards;
        guards.push(RankGuard::of(&current));
        let change = RankChange {
            id: current.id.clone(),
            container: target,
            rank: resolved.rank,
            guards,
        };
        let record = self.store.commit_move(&change).await?;

        info!(
            id = %record.id,
            from = %source,
            to = %record.container,
            rank = %record.rank,
            "moved record"
        );
        Ok(MoveOutcome {
            record,
            moved: true,
        })
    }

    /// Reassign evenly spaced ranks to a container's live records.
    ///
    /// Holds the container exclusively throughout. Creates and moves that
    /// touch it meanwhile fail with [`OrderingError::RebalanceInProgress`].
    pub async fn rebalance(&self, container: &ContainerId) -> Result<Vec<OrderedRecord>> {
        let _lease = self.locks.acquire_rebalance(container).await?;
        self.rebalance_locked(container).await?;
        self.store.live_records(container).await
    }

    /// Soft-delete a record. It keeps its rank.
    pub async fn remove(&self, id: &RecordId) -> Result<OrderedRecord> {
        let record = self.store.soft_delete(id).await?;
        info!(%id, container = %record.container, "removed record");
        Ok(record)
    }

    /// Live records of a container in display order
    pub async fn list(&self, container: &ContainerId) -> Result<Vec<OrderedRecord>> {
        self.store.live_records(container).await
    }

    /// One record, including soft-deleted ones
    pub async fn get(&self, id: &RecordId) -> Result<OrderedRecord> {
        self.store.get(id).await
    }

    async fn live_record(&self, id: &RecordId) -> Result<OrderedRecord> {
        let record = self.store.get(id).await?;
        if !record.is_live() {
            return Err(OrderingError::RecordDeleted { id: id.to_string() });
        }
        Ok(record)
    }

    /// Compute a rank in `container`, rebalancing once on exhaustion when
    /// enabled. The caller holds the container's lease.
    async fn place(
        &self,
        container: &ContainerId,
        placement: &Placement,
        moving: Option<&RecordId>,
    ) -> Result<Resolved> {
        let siblings = self.siblings(container, moving).await?;
        match resolve(container, &siblings, placement, moving) {
            Err(OrderingError::Rank(err)) if err.is_exhausted() && self.config.auto_rebalance => {
                warn!(%container, error = %err, "rank space exhausted, rebalancing");
                let _marker = self.locks.mark_rebalancing(container)?;
                self.rebalance_locked(container).await?;

                let siblings = self.siblings(container, moving).await?;
                let mut resolved = resolve(container, &siblings, placement, moving)?;
                resolved.rebalanced = true;
                Ok(resolved)
            }
            other => other,
        }
    }

    /// Live records of `container` without the moving record
    async fn siblings(
        &self,
        container: &ContainerId,
        moving: Option<&RecordId>,
    ) -> Result<Vec<OrderedRecord>> {
        let mut live = self.store.live_records(container).await?;
        if let Some(id) = moving {
            live.retain(|r| &r.id != id);
        }
        Ok(live)
    }

    /// Rebalance a container whose lease the caller holds
    async fn rebalance_locked(&self, container: &ContainerId) -> Result<()> {
        let live = self.store.live_records(container).await?;
        let mut spaced = live.clone();
        taskboard_rank::rebalance(&mut spaced)?;

        let changes: Vec<RankChange> = live
            .iter()
            .zip(spaced)
            .filter(|(old, new)| old.rank != new.rank)
            .map(|(old, new)| RankChange {
                id: new.id,
                container: new.container,
                rank: new.rank,
                guards: vec![RankGuard::of(old)],
            })
            .collect();

        self.store.apply_rebalance(container, &changes).await?;
        info!(%container, records = live.len(), changed = changes.len(), "rebalanced container");
        Ok(())
    }
}

/// Compute the rank for `placement` among `siblings`, which are sorted and
/// exclude the moving record
fn resolve(
    container: &ContainerId,
    siblings: &[OrderedRecord],
    placement: &Placement,
    moving: Option<&RecordId>,
) -> Result<Resolved> {
    for neighbour in [&placement.before, &placement.after].into_iter().flatten() {
        if Some(neighbour) == moving {
            return Err(OrderingError::SelfNeighbor {
                id: neighbour.to_string(),
            });
        }
    }

    let position = |id: &RecordId| {
        siblings
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| OrderingError::NeighborNotInContainer {
                id: id.to_string(),
                container: container.to_string(),
            })
    };

    let (rank, used) = match (&placement.before, &placement.after) {
        (Some(before), Some(after)) => {
            if before == after {
                return Err(OrderingError::invalid_placement(
                    container,
                    format!("record {} given as both neighbours", before),
                ));
            }
            let (low, high) = (position(before)?, position(after)?);
            if low + 1 != high {
                return Err(OrderingError::invalid_placement(
                    container,
                    format!("{} and {} are not adjacent", before, after),
                ));
            }
            let (low, high) = (&siblings[low], &siblings[high]);
            (Rank::between(&low.rank, &high.rank)?, vec![low, high])
        }
        (Some(before), None) => {
            let index = position(before)?;
            if index + 1 != siblings.len() {
                return Err(OrderingError::invalid_placement(
                    container,
                    format!("{} is not the last record", before),
                ));
            }
            let low = &siblings[index];
            (low.rank.next()?, vec![low])
        }
        (None, Some(after)) => {
            let index = position(after)?;
            if index != 0 {
                return Err(OrderingError::invalid_placement(
                    container,
                    format!("{} is not the first record", after),
                ));
            }
            let high = &siblings[index];
            (high.rank.prev()?, vec![high])
        }
        (None, None) => match siblings.last() {
            Some(last) => (last.rank.next()?, vec![last]),
            None => (Rank::middle(), Vec::new()),
        },
    };

    debug!(%container, %rank, neighbours = used.len(), "resolved placement");
    Ok(Resolved {
        rank,
        guards: used.into_iter().map(RankGuard::of).collect(),
        rebalanced: false,
    })
}
