use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of the outbound `log_activity` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub user_id: String,
    pub action: ActivityAction,
    pub asset_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    AssetUploaded,
    AssetDeleted,
}
