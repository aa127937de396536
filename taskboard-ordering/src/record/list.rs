//! ListRecords command

use crate::error::{OrderingError, Result};
use crate::operation::{Execute, Operation};
use crate::service::OrderingService;
use crate::types::ContainerId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// List a container's live records in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRecords {
    pub container: ContainerId,
}

impl ListRecords {
    pub fn new(container: impl Into<ContainerId>) -> Self {
        Self {
            container: container.into(),
        }
    }
}

impl Operation for ListRecords {
    fn verb(&self) -> &'static str {
        "list"
    }

    fn noun(&self) -> &'static str {
        "records"
    }

    fn description(&self) -> &'static str {
        "List the live records of a container in rank order"
    }
}

#[async_trait]
impl Execute<OrderingService, OrderingError> for ListRecords {
    async fn execute(&self, ctx: &OrderingService) -> Result<Value> {
        let records = ctx.list(&self.container).await?;
        Ok(serde_json::json!({
            "container": self.container,
            "count": records.len(),
            "records": records,
        }))
    }
}
