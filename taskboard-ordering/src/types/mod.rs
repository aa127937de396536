//! Core types for the ordering engine

mod ids;
mod record;

pub use ids::{ContainerId, ContainerKind, RecordId};
pub use record::OrderedRecord;
