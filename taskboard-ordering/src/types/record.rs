//! The orderable record

use super::ids::{ContainerId, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_rank::{Rank, Ranked};

/// A record that holds a rank within one container.
///
/// Soft-deleted records keep their rank but take no part in neighbour
/// lookups or rebalancing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedRecord {
    pub id: RecordId,
    pub container: ContainerId,
    pub rank: Rank,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl OrderedRecord {
    /// Create a live record with a fresh id
    pub fn new(container: ContainerId, rank: Rank) -> Self {
        Self {
            id: RecordId::new(),
            container,
            rank,
            deleted_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Whether the record is live (not soft-deleted)
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl Ranked for OrderedRecord {
    fn rank(&self) -> &Rank {
        &self.rank
    }

    fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_live() {
        let record = OrderedRecord::new(ContainerId::list_cards(1), Rank::middle());
        assert!(record.is_live());
        assert_eq!(record.rank.as_str(), "i");
    }

    #[test]
    fn test_serialization_skips_live_marker() {
        let record = OrderedRecord::new(ContainerId::list_cards(1), Rank::middle());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["container"], "cards:1");
        assert_eq!(json["rank"], "i");
        assert!(json.get("deleted_at").is_none());
    }

    #[test]
    fn test_deserialization_validates_rank() {
        let json = serde_json::json!({
            "id": "r1",
            "container": "cards:1",
            "rank": "NOT A RANK",
            "updated_at": "2026-01-01T00:00:00Z"
        });
        assert!(serde_json::from_value::<OrderedRecord>(json).is_err());
    }
}
