//! SQLite-backed store
//!
//! # Schema
//!
//! - `ordered_records`: one row per record with its container, rank and
//!   soft-delete marker. `rank_key` is the rank without trailing lowest
//!   symbols, so ranks that compare equal share a key and byte order of keys
//!   is rank order.
//! - A partial unique index on `(container_id, rank_key)` over live rows
//!   enforces rank uniqueness within a container.
//!
//! Writes run in `IMMEDIATE` transactions so guards are checked and rows
//! written under the same database write lock, which also holds across
//! processes sharing the file.
//!
//! Every call runs on tokio's blocking pool. Waiting on the busy timeout or on
//! another task's statement never stalls a runtime worker.

use super::{verify_guard, RankChange, RankGuard, RankStore};
use crate::error::{OrderingError, Result};
use crate::types::{ContainerId, OrderedRecord, RecordId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskboard_rank::Rank;
use tracing::{debug, info};

/// How long a connection waits on another process's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Prefix for rank keys parked during a rebalance. Sorts after every
/// alphabet symbol and never appears in a real key.
const PARKED_KEY_PREFIX: &str = "~";

const SELECT_COLUMNS: &str = "id, container_id, rank, deleted_at, updated_at";

/// SQLite store for ranked records.
///
/// The connection sits behind a mutex so the store is `Send + Sync` and can
/// be shared across tokio tasks. The mutex is only taken inside
/// [`spawn_blocking`](tokio::task::spawn_blocking), never on a runtime worker.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        info!(path = %path.display(), "opened ordering database");
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        create_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `work` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| OrderingError::storage("ordering database mutex poisoned"))?;
            work(&mut conn)
        })
        .await
        .map_err(|e| OrderingError::storage(format!("database task failed: {e}")))?
    }
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS ordered_records (
            id TEXT PRIMARY KEY,
            container_id TEXT NOT NULL,
            rank TEXT NOT NULL,
            rank_key TEXT NOT NULL,
            deleted_at TEXT,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_live_rank
            ON ordered_records(container_id, rank_key)
            WHERE deleted_at IS NULL;
        "#,
    )?;
    Ok(())
}

/// Row as stored, before the rank and timestamps are validated
struct RawRecord {
    id: String,
    container: String,
    rank: String,
    deleted_at: Option<String>,
    updated_at: String,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            container: row.get(1)?,
            rank: row.get(2)?,
            deleted_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_record(self) -> Result<OrderedRecord> {
        Ok(OrderedRecord {
            id: RecordId::from_string(self.id),
            container: ContainerId::from_string(self.container),
            rank: Rank::parse(&self.rank)?,
            deleted_at: self.deleted_at.as_deref().map(parse_timestamp).transpose()?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| OrderingError::storage(format!("invalid timestamp '{}': {}", value, e)))
}

fn fetch(conn: &Connection, id: &RecordId) -> Result<Option<OrderedRecord>> {
    let raw = conn
        .prepare_cached(&format!(
            "SELECT {} FROM ordered_records WHERE id = ?1",
            SELECT_COLUMNS
        ))?
        .query_row([id.as_str()], RawRecord::from_row)
        .optional()?;
    raw.map(RawRecord::into_record).transpose()
}

fn check_guards(conn: &Connection, guards: &[RankGuard]) -> Result<()> {
    for guard in guards {
        verify_guard(fetch(conn, &guard.id)?.as_ref(), guard)?;
    }
    Ok(())
}

/// Map a unique-index violation to a rank collision
fn collision(err: rusqlite::Error, container: &ContainerId, rank: &Rank) -> OrderingError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            OrderingError::RankCollision {
                container: container.to_string(),
                rank: rank.to_string(),
            }
        }
        _ => OrderingError::Sqlite(err),
    }
}

#[async_trait]
impl RankStore for SqliteStore {
    async fn get(&self, id: &RecordId) -> Result<OrderedRecord> {
        let id = id.clone();
        self.with_conn(move |conn| {
            fetch(conn, &id)?.ok_or_else(|| OrderingError::RecordNotFound { id: id.to_string() })
        })
        .await
    }

    async fn live_records(&self, container: &ContainerId) -> Result<Vec<OrderedRecord>> {
        let container = container.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {} FROM ordered_records
                 WHERE container_id = ?1 AND deleted_at IS NULL
                 ORDER BY rank_key ASC, id ASC",
                SELECT_COLUMNS
            ))?;
            let rows = stmt
                .query_map([container.as_str()], RawRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter().map(RawRecord::into_record).collect()
        })
        .await
    }

    async fn insert(&self, record: &OrderedRecord, guards: &[RankGuard]) -> Result<()> {
        let record = record.clone();
        let guards = guards.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            check_guards(&tx, &guards)?;

            tx.execute(
                "INSERT INTO ordered_records (id, container_id, rank, rank_key, deleted_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id.as_str(),
                    record.container.as_str(),
                    record.rank.as_str(),
                    record.rank.trimmed(),
                    record.deleted_at.map(|t| t.to_rfc3339()),
                    record.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| collision(e, &record.container, &record.rank))?;

            tx.commit()?;
            debug!(id = %record.id, container = %record.container, rank = %record.rank, "inserted record");
            Ok(())
        })
        .await
    }

    async fn commit_move(&self, change: &RankChange) -> Result<OrderedRecord> {
        let change = change.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            check_guards(&tx, &change.guards)?;

            let current = fetch(&tx, &change.id)?.ok_or_else(|| OrderingError::RecordNotFound {
                id: change.id.to_string(),
            })?;
            if !current.is_live() {
                return Err(OrderingError::RecordDeleted {
                    id: change.id.to_string(),
                });
            }

            tx.execute(
                "UPDATE ordered_records
                 SET container_id = ?2, rank = ?3, rank_key = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    change.id.as_str(),
                    change.container.as_str(),
                    change.rank.as_str(),
                    change.rank.trimmed(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| collision(e, &change.container, &change.rank))?;

            let updated = fetch(&tx, &change.id)?.ok_or_else(|| OrderingError::RecordNotFound {
                id: change.id.to_string(),
            })?;
            tx.commit()?;

            debug!(id = %updated.id, container = %updated.container, rank = %updated.rank, "committed move");
            Ok(updated)
        })
        .await
    }

    async fn apply_rebalance(
        &self,
        container: &ContainerId,
        changes: &[RankChange],
    ) -> Result<()> {
        let container = container.clone();
        let changes = changes.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            for change in &changes {
                check_guards(&tx, &change.guards)?;
            }

            // Park every key first so intermediate states never collide
            for change in &changes {
                let parked = tx.execute(
                    "UPDATE ordered_records SET rank_key = ?2 || id WHERE id = ?1",
                    params![change.id.as_str(), PARKED_KEY_PREFIX],
                )?;
                if parked == 0 {
                    return Err(OrderingError::RecordNotFound {
                        id: change.id.to_string(),
                    });
                }
            }

            let now = Utc::now().to_rfc3339();
            for change in &changes {
                tx.execute(
                    "UPDATE ordered_records
                     SET container_id = ?2, rank = ?3, rank_key = ?4, updated_at = ?5
                     WHERE id = ?1",
                    params![
                        change.id.as_str(),
                        change.container.as_str(),
                        change.rank.as_str(),
                        change.rank.trimmed(),
                        now,
                    ],
                )
                .map_err(|e| collision(e, &change.container, &change.rank))?;
            }

            tx.commit()?;
            debug!(%container, count = changes.len(), "applied rebalance");
            Ok(())
        })
        .await
    }

    async fn soft_delete(&self, id: &RecordId) -> Result<OrderedRecord> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let now = Utc::now().to_rfc3339();
            let updated = conn.execute(
                "UPDATE ordered_records
                 SET deleted_at = ?2, updated_at = ?2
                 WHERE id = ?1 AND deleted_at IS NULL",
                params![id.as_str(), now],
            )?;
            if updated == 0 {
                debug!(%id, "record missing or already deleted");
            }

            fetch(conn, &id)?.ok_or_else(|| OrderingError::RecordNotFound { id: id.to_string() })
        })
        .await
    }
}
