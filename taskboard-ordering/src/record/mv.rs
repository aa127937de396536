//! MoveRecord command

use crate::error::{OrderingError, Result};
use crate::operation::{Execute, Operation};
use crate::service::{MoveRequest, OrderingService, Placement};
use crate::types::{ContainerId, RecordId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Move a record within its container or into another one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The record to move
    pub id: RecordId,
    /// Target container. Defaults to the record's current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerId>,
    /// Record that will precede it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<RecordId>,
    /// Record that will follow it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<RecordId>,
}

impl MoveRecord {
    /// Move to the end of the record's current container
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            container: None,
            before: None,
            after: None,
        }
    }

    /// Move to the end of another container
    pub fn to_container(id: impl Into<RecordId>, container: impl Into<ContainerId>) -> Self {
        Self::new(id).with_container(container)
    }

    pub fn with_container(mut self, container: impl Into<ContainerId>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_before(mut self, id: impl Into<RecordId>) -> Self {
        self.before = Some(id.into());
        self
    }

    pub fn with_after(mut self, id: impl Into<RecordId>) -> Self {
        self.after = Some(id.into());
        self
    }
}

impl Operation for MoveRecord {
    fn verb(&self) -> &'static str {
        "move"
    }

    fn noun(&self) -> &'static str {
        "record"
    }

    fn description(&self) -> &'static str {
        "Move a record between neighbours, optionally into another container"
    }
}

#[async_trait]
impl Execute<OrderingService, OrderingError> for MoveRecord {
    async fn execute(&self, ctx: &OrderingService) -> Result<Value> {
        let request = MoveRequest {
            id: self.id.clone(),
            target: self.container.clone(),
            placement: Placement {
                before: self.before.clone(),
                after: self.after.clone(),
            },
        };

        let outcome = ctx.move_record(&request).await?;
        Ok(serde_json::to_value(&outcome)?)
    }
}
