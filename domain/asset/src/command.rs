use serde::{Deserialize, Serialize};

use crate::model::vo::{AccessLevel, ResourceRef};

/// Request to store a new asset. The bytes travel next to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetCommand {
    pub filename: String,
    pub content_type: String,
    pub user_id: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub is_encrypted: bool,
    pub encryption_key: Option<String>,
    /// Caller supplied metadata, merged into the stored metadata document.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl CreateAssetCommand {
    pub fn resource(&self) -> Option<ResourceRef> {
        ResourceRef::from_parts(self.resource_type.as_deref(), self.resource_id.as_deref())
    }
}
