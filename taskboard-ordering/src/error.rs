//! Error types for ordering operations

use taskboard_rank::RankError;
use thiserror::Error;

/// Result type for ordering operations
pub type Result<T> = std::result::Result<T, OrderingError>;

/// Errors that can occur while placing, moving or rebalancing records
#[derive(Debug, Error)]
pub enum OrderingError {
    /// Rank parsing or generation failed
    #[error(transparent)]
    Rank(#[from] RankError),

    /// Record not found
    #[error("record not found: {id}")]
    RecordNotFound { id: String },

    /// Record has been soft-deleted
    #[error("record has been deleted: {id}")]
    RecordDeleted { id: String },

    /// Neighbour is not a live record of the target container
    #[error("neighbour {id} is not a live record of container '{container}'")]
    NeighborNotInContainer { id: String, container: String },

    /// Neighbours do not describe a single gap in the container
    #[error("invalid placement in container '{container}': {reason}")]
    InvalidPlacement { container: String, reason: String },

    /// A record was named as its own neighbour
    #[error("record {id} cannot be placed relative to itself")]
    SelfNeighbor { id: String },

    /// Container is being rebalanced
    #[error("container '{container}' is being rebalanced")]
    RebalanceInProgress { container: String },

    /// Storage uniqueness constraint rejected the rank
    #[error("rank '{rank}' is already taken in container '{container}'")]
    RankCollision { container: String, rank: String },

    /// A neighbour read before the write moved before commit
    #[error("record {id} changed before commit")]
    NeighborChanged { id: String },

    /// Container lock timeout
    #[error("lock timeout after {elapsed_ms}ms on container '{container}'")]
    LockTimeout { container: String, elapsed_ms: u64 },

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Storage-level failure that is not a SQLite error
    #[error("storage error: {message}")]
    Storage { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl OrderingError {
    /// Create an invalid placement error
    pub fn invalid_placement(container: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidPlacement {
            container: container.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Check if the caller should re-read neighbours and try again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RebalanceInProgress { .. }
                | Self::RankCollision { .. }
                | Self::NeighborChanged { .. }
                | Self::LockTimeout { .. }
        )
    }

    /// Check if the container must be rebalanced before retrying
    pub fn needs_rebalance(&self) -> bool {
        matches!(self, Self::Rank(err) if err.is_exhausted())
    }
}
