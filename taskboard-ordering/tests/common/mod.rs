//! Shared setup for ordering integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use taskboard_ordering::{
    ContainerId, MemoryStore, OrderedRecord, OrderingConfig, OrderingService, RecordId,
    SqliteStore,
};
use tempfile::TempDir;

/// Which store a test runs against
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Memory,
    Sqlite,
}

/// A service plus whatever must outlive it
pub struct Harness {
    pub service: Arc<OrderingService>,
    _temp: Option<TempDir>,
}

impl Harness {
    pub fn new(backend: Backend) -> Self {
        Self::with_config(backend, OrderingConfig::default())
    }

    pub fn with_config(backend: Backend, config: OrderingConfig) -> Self {
        match backend {
            Backend::Memory => Self {
                service: Arc::new(OrderingService::new(Arc::new(MemoryStore::new()), config)),
                _temp: None,
            },
            Backend::Sqlite => {
                let temp = TempDir::new().unwrap();
                let store = SqliteStore::open(temp.path().join("ordering.db")).unwrap();
                Self {
                    service: Arc::new(OrderingService::new(Arc::new(store), config)),
                    _temp: Some(temp),
                }
            }
        }
    }

    pub fn slow_locks(backend: Backend) -> Self {
        Self::with_config(
            backend,
            OrderingConfig::default().with_lock_timeout(Duration::from_secs(30)),
        )
    }

    /// Append `count` records to `container`
    pub async fn fill(&self, container: &ContainerId, count: usize) -> Vec<OrderedRecord> {
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.service.create(container).await.unwrap());
        }
        records
    }

    /// Ids of the live records of `container` in display order
    pub async fn order(&self, container: &ContainerId) -> Vec<RecordId> {
        self.service
            .list(container)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    }
}

/// Assert ranks of a listing strictly increase
pub fn assert_strictly_increasing(records: &[OrderedRecord]) {
    for pair in records.windows(2) {
        assert!(
            pair[0].rank < pair[1].rank,
            "ranks not strictly increasing: {} then {}",
            pair[0].rank,
            pair[1].rank
        );
    }
}
