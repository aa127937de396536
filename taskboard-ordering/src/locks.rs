//! Container-scoped locks
//!
//! Every "read neighbours, compute rank, persist" sequence runs while holding
//! the lock of each container it touches, so two writers never compute a
//! rank from the same neighbours. Locks are taken in sorted container order
//! to rule out deadlock between opposite cross-container moves.
//!
//! A container's slot lives in the registry only while some lease, marker or
//! pending acquisition refers to it.

use crate::error::{OrderingError, Result};
use crate::types::ContainerId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct ContainerSlot {
    gate: Arc<tokio::sync::Mutex<()>>,
    rebalancing: AtomicBool,
}

type Registry = Mutex<HashMap<ContainerId, Arc<ContainerSlot>>>;

/// Drop the container's slot if nobody but the registry and `held` other
/// references still points at it
fn prune(registry: &Registry, container: &ContainerId, held: usize) {
    let Ok(mut slots) = registry.lock() else {
        return;
    };
    let idle = slots.get(container).is_some_and(|slot| {
        Arc::strong_count(slot) == 1 + held && !slot.rebalancing.load(Ordering::Acquire)
    });
    if idle {
        slots.remove(container);
    }
}

/// Registry of per-container async locks
#[derive(Debug)]
pub struct ContainerLocks {
    registry: Arc<Registry>,
    timeout: Duration,
}

/// Exclusive hold on one or more containers, released on drop
#[derive(Debug)]
pub struct ContainerLease {
    registry: Arc<Registry>,
    containers: Vec<ContainerId>,
    slots: Vec<Arc<ContainerSlot>>,
    guards: Vec<OwnedMutexGuard<()>>,
    marker: Option<RebalanceMarker>,
}

/// Marks a container as being rebalanced until dropped
#[derive(Debug)]
pub struct RebalanceMarker {
    registry: Arc<Registry>,
    container: ContainerId,
    slot: Arc<ContainerSlot>,
}

impl Drop for RebalanceMarker {
    fn drop(&mut self) {
        self.slot.rebalancing.store(false, Ordering::Release);
        prune(&self.registry, &self.container, 1);
        debug!(container = %self.container, "rebalance marker cleared");
    }
}

impl ContainerLease {
    /// Containers held by this lease, in lock order
    pub fn containers(&self) -> &[ContainerId] {
        &self.containers
    }
}

impl Drop for ContainerLease {
    fn drop(&mut self) {
        self.guards.clear();
        self.marker.take();
        self.slots.clear();
        for container in &self.containers {
            prune(&self.registry, container, 0);
        }
        debug!(containers = ?self.containers, "released container lease");
    }
}

impl ContainerLocks {
    /// Create a registry whose acquisitions wait at most `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    /// How long an acquisition waits before giving up
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn registry(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ContainerId, Arc<ContainerSlot>>>> {
        self.registry
            .lock()
            .map_err(|_| OrderingError::storage("container lock registry poisoned"))
    }

    fn slot(&self, container: &ContainerId) -> Result<Arc<ContainerSlot>> {
        Ok(self.registry()?.entry(container.clone()).or_default().clone())
    }

    /// Number of containers currently tracked
    pub fn tracked(&self) -> Result<usize> {
        Ok(self.registry()?.len())
    }

    /// Whether a rebalance currently holds or awaits the container
    pub fn is_rebalancing(&self, container: &ContainerId) -> Result<bool> {
        Ok(self
            .registry()?
            .get(container)
            .is_some_and(|slot| slot.rebalancing.load(Ordering::Acquire)))
    }

    /// Lock the containers touched by a create or move.
    ///
    /// Fails with [`OrderingError::RebalanceInProgress`] instead of waiting
    /// when any of them is being rebalanced.
    pub async fn acquire_move(&self, containers: &[&ContainerId]) -> Result<ContainerLease> {
        let mut ordered: Vec<ContainerId> = containers.iter().map(|c| (*c).clone()).collect();
        ordered.sort();
        ordered.dedup();

        // The lease owns every slot from here so any early exit prunes them
        let mut lease = ContainerLease {
            registry: self.registry.clone(),
            slots: Vec::with_capacity(ordered.len()),
            guards: Vec::with_capacity(ordered.len()),
            containers: ordered,
            marker: None,
        };
        for container in &lease.containers {
            lease.slots.push(self.slot(container)?);
        }

        for (container, slot) in lease.containers.iter().zip(&lease.slots) {
            if slot.rebalancing.load(Ordering::Acquire) {
                return Err(OrderingError::RebalanceInProgress {
                    container: container.to_string(),
                });
            }
        }

        for index in 0..lease.containers.len() {
            let guard = self
                .lock_gate(&lease.containers[index], &lease.slots[index])
                .await?;
            lease.guards.push(guard);
        }

        debug!(containers = ?lease.containers, "acquired move lease");
        Ok(lease)
    }

    /// Mark a container as being rebalanced.
    ///
    /// Used directly by a writer that already holds the container's lease.
    /// Fails if another rebalance has claimed it.
    pub fn mark_rebalancing(&self, container: &ContainerId) -> Result<RebalanceMarker> {
        let slot = self.slot(container)?;
        if slot.rebalancing.swap(true, Ordering::AcqRel) {
            return Err(OrderingError::RebalanceInProgress {
                container: container.to_string(),
            });
        }
        Ok(RebalanceMarker {
            registry: self.registry.clone(),
            container: container.clone(),
            slot,
        })
    }

    /// Take a container exclusively for a rebalance.
    ///
    /// Marks the container first so moves arriving meanwhile are rejected,
    /// then waits for writers already inside to finish.
    pub async fn acquire_rebalance(&self, container: &ContainerId) -> Result<ContainerLease> {
        let marker = self.mark_rebalancing(container)?;
        let slot = marker.slot.clone();

        // The lease owns the marker from here and clears it on any exit
        let mut lease = ContainerLease {
            registry: self.registry.clone(),
            containers: vec![container.clone()],
            slots: vec![slot.clone()],
            guards: Vec::with_capacity(1),
            marker: Some(marker),
        };
        let guard = self.lock_gate(container, &slot).await?;
        lease.guards.push(guard);

        debug!(%container, "acquired rebalance lease");
        Ok(lease)
    }

    async fn lock_gate(
        &self,
        container: &ContainerId,
        slot: &ContainerSlot,
    ) -> Result<OwnedMutexGuard<()>> {
        let start = Instant::now();
        match tokio::time::timeout(self.timeout, slot.gate.clone().lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                warn!(%container, elapsed_ms, "timed out waiting for container lock");
                Err(OrderingError::LockTimeout {
                    container: container.to_string(),
                    elapsed_ms,
                })
            }
        }
    }
}
