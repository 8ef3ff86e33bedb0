use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    command::CreateAssetCommand,
    exception::AssetResult,
    model::{
        entity::Asset,
        vo::{AssetFilter, AssetPatch},
    },
};

/// # Asset service
///
/// Keeps the object store, the metadata repository and the cache consistent across partial
/// failures. The cache is only an optimization, never a source of truth.
#[async_trait]
pub trait AssetService: Send + Sync {
    /// Store the bytes, then the record.
    ///
    /// If the record can't be written, the object is removed again. When that removal fails
    /// too, the error is [`AssetException::OrphanedObject`](crate::exception::AssetException::OrphanedObject).
    async fn upload_asset(&self, command: CreateAssetCommand, content: Vec<u8>)
        -> AssetResult<Asset>;

    /// Cache-aside read.
    async fn get_asset_by_id(&self, id: Uuid) -> AssetResult<Asset>;

    /// Page of a user's assets and the total count. Never cached.
    async fn get_assets_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AssetResult<(Vec<Asset>, u64)>;

    /// Remove the object, then soft-delete the record.
    ///
    /// Fails with `Unauthorized` before touching anything when the asset belongs to another user.
    async fn delete_asset(&self, id: Uuid, requesting_user_id: &str) -> AssetResult<()>;

    /// Sparse update of the record.
    async fn update_asset(&self, patch: AssetPatch) -> AssetResult<Asset>;

    async fn search_assets(&self, filter: AssetFilter) -> AssetResult<(Vec<Asset>, u64)>;

    /// The asset and its stored bytes.
    async fn get_asset_content(&self, id: Uuid) -> AssetResult<(Asset, Vec<u8>)>;

    /// Temporary url to download the content.
    async fn get_download_url(&self, id: Uuid, ttl: Duration) -> AssetResult<String>;
}
