//! RebalanceContainer command

use crate::error::{OrderingError, Result};
use crate::operation::{Execute, Operation};
use crate::service::OrderingService;
use crate::types::ContainerId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reassign evenly spaced ranks across a container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceContainer {
    pub container: ContainerId,
}

impl RebalanceContainer {
    pub fn new(container: impl Into<ContainerId>) -> Self {
        Self {
            container: container.into(),
        }
    }
}

impl Operation for RebalanceContainer {
    fn verb(&self) -> &'static str {
        "rebalance"
    }

    fn noun(&self) -> &'static str {
        "container"
    }

    fn description(&self) -> &'static str {
        "Respace the ranks of a container, keeping its order"
    }
}

#[async_trait]
impl Execute<OrderingService, OrderingError> for RebalanceContainer {
    async fn execute(&self, ctx: &OrderingService) -> Result<Value> {
        let records = ctx.rebalance(&self.container).await?;
        Ok(serde_json::json!({
            "container": self.container,
            "count": records.len(),
            "records": records,
        }))
    }
}
