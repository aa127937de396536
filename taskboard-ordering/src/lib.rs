//! Ordering for task-board records
//!
//! Lists on a board, cards in a list and items in a checklist are each kept
//! in order by a [`Rank`](taskboard_rank::Rank). This crate owns everything
//! around the pure rank engine: where records live ([`RankStore`]), how a
//! move is turned into one new rank ([`OrderingService`]), and how
//! concurrent writers to one container are kept apart
//! ([`ContainerLocks`](locks::ContainerLocks)).
//!
//! ## Basic Usage
//!
//! ```rust
//! use taskboard_ordering::{ContainerId, MoveRequest, OrderingService, Placement};
//!
//! # async fn example() -> taskboard_ordering::Result<()> {
//! let service = OrderingService::in_memory();
//! let todo = ContainerId::list_cards("todo");
//! let done = ContainerId::list_cards("done");
//!
//! let a = service.create(&todo).await?;
//! let b = service.create(&todo).await?;
//!
//! // Put b in front of a
//! service
//!     .move_record(&MoveRequest::new(b.id.clone(), todo.clone(), Placement::preceding(a.id.clone())))
//!     .await?;
//!
//! // Move a into another list
//! let outcome = service
//!     .move_record(&MoveRequest::new(a.id.clone(), done.clone(), Placement::end()))
//!     .await?;
//! assert_eq!(outcome.record.container, done);
//! # Ok(())
//! # }
//! ```
//!
//! ## Commands
//!
//! The [`record`] and [`container`] modules wrap each operation in a
//! serde-deserializable command returning JSON, run through
//! [`OrderingProcessor`].

pub mod config;
pub mod container;
mod error;
pub mod locks;
pub mod operation;
pub mod record;
mod service;
pub mod store;
pub mod types;

pub use config::OrderingConfig;
pub use error::{OrderingError, Result};
pub use operation::{Execute, LogEntry, Operation, OrderingProcessor};
pub use service::{MoveOutcome, MoveRequest, OrderingService, Placement};
pub use store::{MemoryStore, RankChange, RankGuard, RankStore, SqliteStore};
pub use types::{ContainerId, ContainerKind, OrderedRecord, RecordId};

pub use taskboard_rank::{Rank, RankError, MAX_RANK_LEN};
