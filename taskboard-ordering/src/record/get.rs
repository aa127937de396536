//! GetRecord command

use crate::error::{OrderingError, Result};
use crate::operation::{Execute, Operation};
use crate::service::OrderingService;
use crate::types::RecordId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Get a record by ID, including deleted ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRecord {
    pub id: RecordId,
}

impl GetRecord {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self { id: id.into() }
    }
}

impl Operation for GetRecord {
    fn verb(&self) -> &'static str {
        "get"
    }

    fn noun(&self) -> &'static str {
        "record"
    }

    fn description(&self) -> &'static str {
        "Retrieve a record by ID"
    }
}

#[async_trait]
impl Execute<OrderingService, OrderingError> for GetRecord {
    async fn execute(&self, ctx: &OrderingService) -> Result<Value> {
        let record = ctx.get(&self.id).await?;
        let mut result = serde_json::to_value(&record)?;
        result["live"] = serde_json::json!(record.is_live());
        Ok(result)
    }
}
