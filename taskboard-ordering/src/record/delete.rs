//! DeleteRecord command

use crate::error::{OrderingError, Result};
use crate::operation::{Execute, Operation};
use crate::service::OrderingService;
use crate::types::RecordId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Soft-delete a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRecord {
    pub id: RecordId,
}

impl DeleteRecord {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self { id: id.into() }
    }
}

impl Operation for DeleteRecord {
    fn verb(&self) -> &'static str {
        "delete"
    }

    fn noun(&self) -> &'static str {
        "record"
    }

    fn description(&self) -> &'static str {
        "Soft-delete a record, keeping its rank"
    }
}

#[async_trait]
impl Execute<OrderingService, OrderingError> for DeleteRecord {
    async fn execute(&self, ctx: &OrderingService) -> Result<Value> {
        let record = ctx.remove(&self.id).await?;
        Ok(serde_json::json!({
            "deleted": true,
            "id": record.id,
            "container": record.container,
            "rank": record.rank,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AddRecord;
    use crate::types::ContainerId;

    #[tokio::test]
    async fn test_delete_record() {
        let ctx = OrderingService::in_memory();
        let added = AddRecord::new("items:1").execute(&ctx).await.unwrap();
        let id = added["id"].as_str().unwrap();

        let result = DeleteRecord::new(id).execute(&ctx).await.unwrap();
        assert_eq!(result["deleted"], true);
        assert_eq!(result["rank"], "i");

        assert!(ctx
            .list(&ContainerId::checklist_items(1))
            .await
            .unwrap()
            .is_empty());
        // Still readable by id
        assert!(!ctx.get(&RecordId::from(id)).await.unwrap().is_live());
    }

    #[tokio::test]
    async fn test_delete_missing_record() {
        let ctx = OrderingService::in_memory();
        let result = DeleteRecord::new("nope").execute(&ctx).await;
        assert!(matches!(result, Err(OrderingError::RecordNotFound { .. })));
    }
}
