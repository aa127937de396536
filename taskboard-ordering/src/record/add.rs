//! AddRecord command

use crate::error::{OrderingError, Result};
use crate::operation::{Execute, Operation};
use crate::service::{OrderingService, Placement};
use crate::types::{ContainerId, RecordId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Add a new record to a container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRecord {
    /// Container to add to
    pub container: ContainerId,
    /// Record that will precede the new one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<RecordId>,
    /// Record that will follow the new one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<RecordId>,
}

impl AddRecord {
    /// Append to the end of `container`
    pub fn new(container: impl Into<ContainerId>) -> Self {
        Self {
            container: container.into(),
            before: None,
            after: None,
        }
    }

    /// Set the preceding neighbour
    pub fn with_before(mut self, id: impl Into<RecordId>) -> Self {
        self.before = Some(id.into());
        self
    }

    /// Set the following neighbour
    pub fn with_after(mut self, id: impl Into<RecordId>) -> Self {
        self.after = Some(id.into());
        self
    }

    fn placement(&self) -> Placement {
        Placement {
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

impl Operation for AddRecord {
    fn verb(&self) -> &'static str {
        "add"
    }

    fn noun(&self) -> &'static str {
        "record"
    }

    fn description(&self) -> &'static str {
        "Add a record to a container, at the end or between neighbours"
    }
}

#[async_trait]
impl Execute<OrderingService, OrderingError> for AddRecord {
    async fn execute(&self, ctx: &OrderingService) -> Result<Value> {
        let record = ctx.create_at(&self.container, &self.placement()).await?;
        Ok(serde_json::to_value(&record)?)
    }
}
