use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_asset::{
    command::CreateAssetCommand,
    exception::{AssetException, AssetResult},
    model::{
        entity::Asset,
        event::{ActivityAction, ActivityLog, DomainEvent, EventType},
        vo::{AssetFilter, AssetPatch, HashAlgorithm, ResourceRef},
    },
    repository::AssetRepo,
    service::{AssetService, CacheService, EventPublisher, ObjectStorageService},
};
use serde_json::{Map, Value};
use typed_builder::TypedBuilder;
use uuid::Uuid;

fn cache_key(id: Uuid) -> String {
    format!("asset:{id}")
}

/// `{type}/{id}/{slug}`, `{type}/{slug}` or `{slug}` depending on the resource association.
fn storage_key(id: Uuid, filename: &str, resource: Option<&ResourceRef>) -> String {
    let slug = format!("{}_{}", id.simple(), filename.replace(['/', '\\'], "_"));
    match resource {
        Some(resource) => format!("{}/{slug}", resource.key_prefix()),
        None => slug,
    }
}

fn metadata_document(
    custom: Option<Value>,
    file_hash: &str,
    storage_key: &str,
    uploaded_at: DateTime<Utc>,
) -> Value {
    let mut doc = match custom {
        Some(Value::Object(fields)) => fields,
        None | Some(Value::Null) => Map::new(),
        Some(other) => {
            tracing::warn!(metadata = %other, "Ignoring metadata that isn't an object.");
            Map::new()
        }
    };
    doc.insert("file_hash".to_owned(), file_hash.into());
    doc.insert("hash_algorithm".to_owned(), HashAlgorithm::Blake3.to_string().into());
    doc.insert("upload_timestamp".to_owned(), uploaded_at.to_rfc3339().into());
    doc.insert("storage_key".to_owned(), storage_key.into());
    Value::Object(doc)
}

fn validate(command: &CreateAssetCommand, content: &[u8]) -> AssetResult<()> {
    if command.filename.trim().is_empty() {
        return Err(AssetException::invalid_input("filename is empty"));
    }
    if command.content_type.trim().is_empty() {
        return Err(AssetException::invalid_input("content type is empty"));
    }
    if content.is_empty() {
        return Err(AssetException::invalid_input("content is empty"));
    }
    Ok(())
}

fn repo_err(source: anyhow::Error) -> AssetException {
    AssetException::RepositoryError { source }
}

#[derive(TypedBuilder)]
pub struct AssetServiceImpl {
    asset_repo: Arc<dyn AssetRepo>,
    object_storage: Arc<dyn ObjectStorageService>,
    cache_service: Arc<dyn CacheService>,
    #[builder(default, setter(strip_option))]
    event_publisher: Option<Arc<dyn EventPublisher>>,
    /// Topic receiving `log_activity` events. Nothing is published without it.
    #[builder(default, setter(strip_option, into))]
    activity_topic: Option<String>,
    #[builder(default = Duration::from_secs(3600))]
    cache_ttl: Duration,
    #[builder(default = "minio".to_owned(), setter(into))]
    storage_provider: String,
    #[builder(default = "assets".to_owned(), setter(into))]
    public_url_prefix: String,
}

impl AssetServiceImpl {
    fn public_url(&self, id: Uuid) -> String {
        format!("{}/{id}", self.public_url_prefix.trim_end_matches('/'))
    }

    async fn cached(&self, id: Uuid) -> Option<Asset> {
        let bytes = match self.cache_service.get(&cache_key(id)).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%id, "Cache read failed: {e}");
                return None;
            }
        };
        match serde_json::from_slice::<Asset>(&bytes) {
            Ok(asset) if asset.is_live() => Some(asset),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(%id, "Corrupt cache entry: {e}");
                None
            }
        }
    }

    async fn cache(&self, asset: &Asset) {
        let bytes = match serde_json::to_vec(asset) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(id = %asset.id, "Failed to encode asset for cache: {e}");
                return;
            }
        };
        let key = cache_key(asset.id);
        if let Err(e) = self.cache_service.set(&key, &bytes, Some(self.cache_ttl)).await {
            tracing::warn!(id = %asset.id, "Cache write failed: {e}");
        }
    }

    async fn invalidate(&self, id: Uuid) {
        if let Err(e) = self.cache_service.delete(&cache_key(id)).await {
            tracing::warn!(%id, "Cache invalidation failed: {e}");
        }
    }

    async fn log_activity(&self, asset: &Asset, user_id: Option<&str>, action: ActivityAction) {
        let (Some(publisher), Some(topic)) = (&self.event_publisher, &self.activity_topic) else {
            return;
        };
        let user_id = user_id.or(asset.user_id.as_deref()).unwrap_or_default();
        let log = ActivityLog {
            user_id: user_id.to_owned(),
            action,
            asset_id: asset.id,
            timestamp: Utc::now(),
        };
        let data = match serde_json::to_value(&log) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(id = %asset.id, "Failed to encode activity log: {e}");
                return;
            }
        };
        let mut event = DomainEvent::new(EventType::log_activity(), asset.id.to_string(), data);
        if !user_id.is_empty() {
            event = event.with_user(user_id);
        }
        if let Err(e) = publisher.publish(topic, &event).await {
            tracing::warn!(id = %asset.id, ?action, "Failed to publish activity log: {e}");
        }
    }

    /// Undo the object write of a failed upload.
    async fn compensate_upload(&self, storage_key: &str, source: anyhow::Error) -> AssetException {
        match self.object_storage.delete(storage_key).await {
            Ok(()) => {
                tracing::warn!(storage_key, "Record write failed, object removed: {source}");
                AssetException::RepositoryError { source }
            }
            Err(rollback) => {
                tracing::error!(
                    storage_key,
                    "Record write failed and object removal failed, object is orphaned: {source}, {rollback}"
                );
                AssetException::OrphanedObject {
                    storage_key: storage_key.to_owned(),
                    source,
                    rollback,
                }
            }
        }
    }

    async fn record_access(&self, id: Uuid) {
        match self.asset_repo.touch(id).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(%id, "Asset vanished before access was recorded."),
            Err(e) => tracing::warn!(%id, "Failed to record access: {e}"),
        }
    }

    async fn load_live(&self, id: Uuid) -> AssetResult<Asset> {
        self.asset_repo
            .get_by_id(id)
            .await
            .map_err(repo_err)?
            .filter(Asset::is_live)
            .ok_or(AssetException::NotFound { id })
    }
}

#[async_trait]
impl AssetService for AssetServiceImpl {
    async fn upload_asset(
        &self,
        command: CreateAssetCommand,
        content: Vec<u8>,
    ) -> AssetResult<Asset> {
        validate(&command, &content)?;

        let id = Uuid::new_v4();
        let resource = command.resource();
        let storage_key = storage_key(id, &command.filename, resource.as_ref());
        let file_hash = blake3::hash(&content).to_string();
        let file_size = content.len() as u64;

        let url = self
            .object_storage
            .put(&storage_key, content, &command.content_type)
            .await
            .map_err(|source| AssetException::StorageWriteFailed {
                storage_key: storage_key.to_owned(),
                source,
            })?;

        let now = Utc::now();
        let asset = Asset {
            id,
            url,
            public_url: Some(self.public_url(id)),
            metadata: metadata_document(command.metadata, &file_hash, &storage_key, now),
            filename: command.filename,
            file_size,
            secure: command.secure,
            storage_key: storage_key.to_owned(),
            storage_provider: self.storage_provider.to_owned(),
            resource_type: resource.as_ref().map(|r| r.resource_type.to_owned()),
            resource_id: resource.and_then(|r| r.resource_id),
            content_type: command.content_type,
            user_id: command.user_id.filter(|u| !u.is_empty()),
            access_level: command.access_level,
            allowed_roles: command.allowed_roles,
            is_encrypted: command.is_encrypted,
            encryption_key: command.encryption_key,
            last_accessed_at: None,
            deleted_at: None,
            tags: command.tags,
            file_hash,
            created_at: now,
            updated_at: now,
            active: true,
        };

        let asset = match self.asset_repo.create(&asset).await {
            Ok(asset) => asset,
            Err(source) => return Err(self.compensate_upload(&storage_key, source).await),
        };
        tracing::info!(id = %asset.id, %storage_key, size = file_size, "Asset uploaded.");

        self.cache(&asset).await;
        self.log_activity(&asset, None, ActivityAction::AssetUploaded).await;
        Ok(asset)
    }

    async fn get_asset_by_id(&self, id: Uuid) -> AssetResult<Asset> {
        if let Some(asset) = self.cached(id).await {
            return Ok(asset);
        }
        let asset = self.load_live(id).await?;
        self.cache(&asset).await;
        Ok(asset)
    }

    async fn get_assets_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AssetResult<(Vec<Asset>, u64)> {
        if user_id.is_empty() {
            return Err(AssetException::invalid_input("user id is empty"));
        }
        self.asset_repo.get_all_by_user_id(user_id, limit, offset).await.map_err(repo_err)
    }

    async fn delete_asset(&self, id: Uuid, requesting_user_id: &str) -> AssetResult<()> {
        let asset = self.load_live(id).await?;
        if asset.is_owned_by_other(requesting_user_id) {
            return Err(AssetException::Unauthorized {
                id,
                user_id: requesting_user_id.to_owned(),
            });
        }

        self.object_storage.delete(&asset.storage_key).await.map_err(|source| {
            AssetException::StorageDeleteFailed {
                storage_key: asset.storage_key.to_owned(),
                source,
            }
        })?;

        self.invalidate(id).await;

        let deleted = match self.asset_repo.soft_delete(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(anyhow!("No live record left to mark deleted.")),
            Err(e) => Err(e),
        };
        if let Err(source) = deleted {
            tracing::error!(%id, storage_key = %asset.storage_key, "Object deleted but record wasn't: {source}");
            return Err(AssetException::PartialDeleteInconsistency {
                id,
                storage_key: asset.storage_key,
                source,
            });
        }
        tracing::info!(%id, "Asset deleted.");

        let actor = Some(requesting_user_id).filter(|u| !u.is_empty());
        self.log_activity(&asset, actor, ActivityAction::AssetDeleted).await;
        Ok(())
    }

    async fn update_asset(&self, patch: AssetPatch) -> AssetResult<Asset> {
        if patch.is_empty() {
            return Err(AssetException::invalid_input("nothing to update"));
        }
        if patch.filename.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(AssetException::invalid_input("filename is empty"));
        }
        if patch.content_type.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AssetException::invalid_input("content type is empty"));
        }
        let id = patch.id;
        let asset = self
            .asset_repo
            .update(patch)
            .await
            .map_err(repo_err)?
            .ok_or(AssetException::NotFound { id })?;
        self.invalidate(id).await;
        Ok(asset)
    }

    async fn search_assets(&self, mut filter: AssetFilter) -> AssetResult<(Vec<Asset>, u64)> {
        if filter.limit == 0 {
            filter.limit = AssetFilter::DEFAULT_LIMIT;
        }
        self.asset_repo.search(&filter).await.map_err(repo_err)
    }

    async fn get_asset_content(&self, id: Uuid) -> AssetResult<(Asset, Vec<u8>)> {
        let asset = self.get_asset_by_id(id).await?;
        let content = self.object_storage.get(&asset.storage_key).await.map_err(|source| {
            AssetException::StorageReadFailed {
                storage_key: asset.storage_key.to_owned(),
                source,
            }
        })?;
        self.record_access(id).await;
        Ok((asset, content))
    }

    async fn get_download_url(&self, id: Uuid, ttl: Duration) -> AssetResult<String> {
        let asset = self.get_asset_by_id(id).await?;
        let url = self.object_storage.presign(&asset.storage_key, ttl).await.map_err(|source| {
            AssetException::StorageReadFailed {
                storage_key: asset.storage_key.to_owned(),
                source,
            }
        })?;
        self.record_access(id).await;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_follows_resource_association() {
        let id = Uuid::new_v4();
        let slug = format!("{}_avatar.png", id.simple());

        assert_eq!(storage_key(id, "avatar.png", None), slug);

        let users = ResourceRef::from_parts(Some("users"), None);
        assert_eq!(storage_key(id, "avatar.png", users.as_ref()), format!("users/{slug}"));

        let user = ResourceRef::from_parts(Some("users"), Some("42"));
        assert_eq!(storage_key(id, "avatar.png", user.as_ref()), format!("users/42/{slug}"));
    }

    #[test]
    fn filename_cannot_escape_prefix() {
        let id = Uuid::new_v4();
        let key = storage_key(id, "../etc/passwd", None);
        assert!(!key.contains('/'));
    }

    #[test]
    fn system_fields_win() {
        let custom = serde_json::json!({"description": "x", "file_hash": "forged"});
        let doc = metadata_document(Some(custom), "abc", "k", Utc::now());
        assert_eq!(doc["description"], "x");
        assert_eq!(doc["file_hash"], "abc");
        assert_eq!(doc["hash_algorithm"], "blake3");
        assert_eq!(doc["storage_key"], "k");

        let doc = metadata_document(Some(serde_json::json!([1, 2])), "abc", "k", Utc::now());
        assert_eq!(doc.as_object().map(|m| m.len()), Some(4));
    }
}
