use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::vo::{AccessLevel, ResourceRef};

/// Durable record of one stored binary object.
///
/// The bytes live in the object store under `storage_key`, everything else lives in the
/// metadata repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Id, assigned at creation and never reused.
    pub id: Uuid,
    /// Internal locator returned by the object store.
    pub url: String,
    /// Public facing locator.
    pub public_url: Option<String>,
    /// Original file name.
    pub filename: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Free-form metadata document.
    pub metadata: serde_json::Value,
    /// Whether the asset is stored securely.
    pub secure: bool,
    /// Key of the object in the object store.
    pub storage_key: String,
    /// Object store provider tag, e.g. `minio`.
    pub storage_provider: String,
    /// Type of the associated external resource.
    pub resource_type: Option<String>,
    /// Id of the associated external resource.
    pub resource_id: Option<String>,
    /// MIME type.
    pub content_type: String,
    /// Owning user.
    pub user_id: Option<String>,
    pub access_level: AccessLevel,
    pub allowed_roles: Vec<String>,
    pub is_encrypted: bool,
    /// Reference to the key used for encryption.
    pub encryption_key: Option<String>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Soft delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    /// Hex digest of the exact bytes stored under `storage_key`.
    pub file_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
}

impl Asset {
    /// Soft-deleted or inactive assets are invisible to every read path.
    pub fn is_live(&self) -> bool {
        self.active && self.deleted_at.is_none()
    }

    /// Whether the asset has a non-empty owner that differs from `user_id`.
    pub fn is_owned_by_other(&self, user_id: &str) -> bool {
        match self.user_id.as_deref() {
            Some(owner) if !owner.is_empty() => owner != user_id,
            _ => false,
        }
    }

    pub fn resource(&self) -> Option<ResourceRef> {
        ResourceRef::from_parts(self.resource_type.as_deref(), self.resource_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(user_id: Option<&str>) -> Asset {
        let now = Utc::now();
        Asset {
            id: Uuid::new_v4(),
            url: "http://localhost:9000/assets/1_test.jpg".to_owned(),
            public_url: None,
            filename: "test.jpg".to_owned(),
            file_size: 3,
            metadata: serde_json::json!({}),
            secure: false,
            storage_key: "1_test.jpg".to_owned(),
            storage_provider: "minio".to_owned(),
            resource_type: None,
            resource_id: None,
            content_type: "image/jpeg".to_owned(),
            user_id: user_id.map(str::to_owned),
            access_level: AccessLevel::Public,
            allowed_roles: vec![],
            is_encrypted: false,
            encryption_key: None,
            last_accessed_at: None,
            deleted_at: None,
            tags: vec![],
            file_hash: String::new(),
            created_at: now,
            updated_at: now,
            active: true,
        }
    }

    #[test]
    fn ownership() {
        assert!(asset(Some("user-b")).is_owned_by_other("user-a"));
        assert!(!asset(Some("user-a")).is_owned_by_other("user-a"));
        assert!(!asset(Some("")).is_owned_by_other("user-a"));
        assert!(!asset(None).is_owned_by_other("user-a"));
    }

    #[test]
    fn soft_deleted_is_not_live() {
        let mut a = asset(None);
        assert!(a.is_live());
        a.deleted_at = Some(Utc::now());
        assert!(!a.is_live());
        a.deleted_at = None;
        a.active = false;
        assert!(!a.is_live());
    }
}
