//! Command layer
//!
//! Each command is a plain struct whose fields are its parameters. It names
//! itself through [`Operation`] and runs against an [`OrderingService`]
//! through [`Execute`], returning JSON. [`OrderingProcessor`] runs commands
//! and keeps the most recent log entries.

use crate::error::{OrderingError, Result};
use crate::service::OrderingService;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Static description of a command
pub trait Operation {
    /// Action, e.g. "move"
    fn verb(&self) -> &'static str;

    /// Target, e.g. "record"
    fn noun(&self) -> &'static str;

    /// One-line human description
    fn description(&self) -> &'static str;

    /// Canonical op string, e.g. "move record"
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Run a command against a context
#[async_trait]
pub trait Execute<C, E>: Operation
where
    C: Send + Sync,
{
    async fn execute(&self, ctx: &C) -> std::result::Result<Value, E>;
}

/// Record of one processed command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ULID of the entry
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Canonical op string
    pub op: String,
    /// Command parameters
    pub input: Value,
    /// Result value, or `{"error": ...}` on failure
    pub output: Value,
    pub duration_ms: u64,
}

impl LogEntry {
    pub fn new(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            duration_ms,
        }
    }
}

/// Log entries a processor keeps by default
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Runs commands and logs each execution.
///
/// Only the newest `capacity` entries are kept; older ones are evicted.
#[derive(Debug)]
pub struct OrderingProcessor {
    log: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl Default for OrderingProcessor {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl OrderingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor keeping at most `capacity` entries. Zero keeps none.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            log: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Execute `operation`, then log it with its duration
    pub async fn process<T>(&self, operation: &T, service: &OrderingService) -> Result<Value>
    where
        T: Execute<OrderingService, OrderingError> + Serialize + Send + Sync,
    {
        let op = operation.op_string();
        let input = serde_json::to_value(operation)?;
        let start = Instant::now();
        let result = operation.execute(service).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let output = match &result {
            Ok(value) => {
                info!(%op, duration_ms, "processed operation");
                value.clone()
            }
            Err(err) => {
                warn!(%op, duration_ms, error = %err, "operation failed");
                serde_json::json!({ "error": err.to_string() })
            }
        };
        if self.capacity > 0 {
            let mut log = self.log.lock().await;
            while log.len() >= self.capacity {
                log.pop_front();
            }
            log.push_back(LogEntry::new(op, input, output, duration_ms));
        }

        result
    }

    /// Retained entries, oldest first
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.log.lock().await.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AddRecord, DeleteRecord, ListRecords};

    #[tokio::test]
    async fn test_process_logs_success() {
        let service = OrderingService::in_memory();
        let processor = OrderingProcessor::new();

        let result = processor
            .process(&AddRecord::new("cards:1"), &service)
            .await
            .unwrap();

        let entries = processor.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].op, "add record");
        assert_eq!(entries[0].input["container"], "cards:1");
        assert_eq!(entries[0].output, result);
    }

    #[tokio::test]
    async fn test_process_logs_failure() {
        let service = OrderingService::in_memory();
        let processor = OrderingProcessor::new();

        let result = processor.process(&DeleteRecord::new("nope"), &service).await;
        assert!(result.is_err());

        let entries = processor.entries().await;
        assert_eq!(entries[0].op, "delete record");
        assert!(entries[0].output["error"]
            .as_str()
            .unwrap()
            .contains("not found"));
    }

    #[tokio::test]
    async fn test_log_keeps_only_newest_entries() {
        let service = OrderingService::in_memory();
        let processor = OrderingProcessor::with_capacity(8);

        for i in 0..50 {
            let container = format!("cards:{}", i);
            processor
                .process(&ListRecords::new(container.as_str()), &service)
                .await
                .unwrap();
        }

        let entries = processor.entries().await;
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[0].input["container"], "cards:42");
        assert_eq!(entries[7].input["container"], "cards:49");
    }

    #[tokio::test]
    async fn test_zero_capacity_keeps_nothing() {
        let service = OrderingService::in_memory();
        let processor = OrderingProcessor::with_capacity(0);

        processor
            .process(&ListRecords::new("cards:1"), &service)
            .await
            .unwrap();
        assert!(processor.entries().await.is_empty());
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(OrderingProcessor::new().capacity(), DEFAULT_LOG_CAPACITY);
    }
}
