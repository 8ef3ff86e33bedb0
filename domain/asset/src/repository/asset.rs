use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    entity::Asset,
    vo::{AssetFilter, AssetPatch},
};

/// Durable store of asset records.
///
/// Every read excludes records that are soft-deleted or inactive.
#[async_trait]
pub trait AssetRepo: Send + Sync {
    /// Insert a record and return it as persisted.
    async fn create(&self, asset: &Asset) -> anyhow::Result<Asset>;

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Asset>>;

    /// Page of a user's assets with the total count independent of the page.
    async fn get_all_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<(Vec<Asset>, u64)>;

    async fn search(&self, filter: &AssetFilter) -> anyhow::Result<(Vec<Asset>, u64)>;

    /// Apply a sparse update. `None` when no live record has the id.
    async fn update(&self, patch: AssetPatch) -> anyhow::Result<Option<Asset>>;

    /// Mark a record deleted. `false` when no live record has the id.
    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Record an access. `false` when no live record has the id.
    async fn touch(&self, id: Uuid) -> anyhow::Result<bool>;
}
