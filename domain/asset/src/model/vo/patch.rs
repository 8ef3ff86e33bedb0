use uuid::Uuid;

use super::AccessLevel;
use crate::model::entity::Asset;

/// Sparse update of an asset. Only `Some` fields overwrite.
///
/// Fields bound to the stored bytes (`storage_key`, `file_hash`, `file_size`, `url`) are not
/// patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPatch {
    pub id: Uuid,
    pub public_url: Option<String>,
    pub filename: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub secure: Option<bool>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub content_type: Option<String>,
    pub user_id: Option<String>,
    pub access_level: Option<AccessLevel>,
    pub allowed_roles: Option<Vec<String>>,
    pub is_encrypted: Option<bool>,
    pub encryption_key: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl AssetPatch {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        let Self {
            id: _,
            public_url,
            filename,
            metadata,
            secure,
            resource_type,
            resource_id,
            content_type,
            user_id,
            access_level,
            allowed_roles,
            is_encrypted,
            encryption_key,
            tags,
        } = self;
        public_url.is_none()
            && filename.is_none()
            && metadata.is_none()
            && secure.is_none()
            && resource_type.is_none()
            && resource_id.is_none()
            && content_type.is_none()
            && user_id.is_none()
            && access_level.is_none()
            && allowed_roles.is_none()
            && is_encrypted.is_none()
            && encryption_key.is_none()
            && tags.is_none()
    }

    /// Overwrite the fields of `asset` that this patch carries.
    pub fn apply_to(self, asset: &mut Asset) {
        macro_rules! overwrite {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field {
                    asset.$field = v;
                })*
            };
        }
        macro_rules! overwrite_opt {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field {
                    asset.$field = Some(v);
                })*
            };
        }
        overwrite!(
            filename,
            metadata,
            secure,
            content_type,
            access_level,
            allowed_roles,
            is_encrypted,
            tags
        );
        overwrite_opt!(public_url, resource_type, resource_id, user_id, encryption_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch() {
        let id = Uuid::new_v4();
        assert!(AssetPatch::new(id).is_empty());
        let patch = AssetPatch {
            filename: Some("updated-file.jpg".to_owned()),
            ..AssetPatch::new(id)
        };
        assert!(!patch.is_empty());
    }
}
