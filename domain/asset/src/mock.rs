use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use uuid::Uuid;

use crate::{
    command::CreateAssetCommand,
    exception::AssetResult,
    model::{
        entity::Asset,
        event::DomainEvent,
        vo::{AssetFilter, AssetPatch},
    },
    repository::AssetRepo,
    service::{
        AssetService, CacheService, EventContext, EventHandler, EventPublisher,
        ObjectStorageService,
    },
};

mock! {
    pub AssetRepo {}
    #[async_trait]
    impl AssetRepo for AssetRepo {
        async fn create(&self, asset: &Asset) -> anyhow::Result<Asset>;
        async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Asset>>;
        async fn get_all_by_user_id(
            &self,
            user_id: &str,
            limit: u64,
            offset: u64,
        ) -> anyhow::Result<(Vec<Asset>, u64)>;
        async fn search(&self, filter: &AssetFilter) -> anyhow::Result<(Vec<Asset>, u64)>;
        async fn update(&self, patch: AssetPatch) -> anyhow::Result<Option<Asset>>;
        async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool>;
        async fn touch(&self, id: Uuid) -> anyhow::Result<bool>;
    }
}

mock! {
    pub ObjectStorageService {}
    #[async_trait]
    impl ObjectStorageService for ObjectStorageService {
        async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> anyhow::Result<String>;
        async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
        async fn delete(&self, key: &str) -> anyhow::Result<()>;
        async fn presign(&self, key: &str, ttl: Duration) -> anyhow::Result<String>;
    }
}

mock! {
    pub CacheService {}
    #[async_trait]
    impl CacheService for CacheService {
        async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> anyhow::Result<()>;
        async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
        async fn delete(&self, key: &str) -> anyhow::Result<()>;
    }
}

mock! {
    pub EventPublisher {}
    #[async_trait]
    impl EventPublisher for EventPublisher {
        async fn publish(&self, topic: &str, event: &DomainEvent) -> anyhow::Result<()>;
    }
}

mock! {
    pub EventHandler {}
    #[async_trait]
    impl EventHandler for EventHandler {
        async fn handle(&self, ctx: &EventContext, event: &DomainEvent) -> anyhow::Result<()>;
    }
}

mock! {
    pub AssetService {}
    #[async_trait]
    impl AssetService for AssetService {
        async fn upload_asset(
            &self,
            command: CreateAssetCommand,
            content: Vec<u8>,
        ) -> AssetResult<Asset>;
        async fn get_asset_by_id(&self, id: Uuid) -> AssetResult<Asset>;
        async fn get_assets_by_user_id(
            &self,
            user_id: &str,
            limit: u64,
            offset: u64,
        ) -> AssetResult<(Vec<Asset>, u64)>;
        async fn delete_asset(&self, id: Uuid, requesting_user_id: &str) -> AssetResult<()>;
        async fn update_asset(&self, patch: AssetPatch) -> AssetResult<Asset>;
        async fn search_assets(&self, filter: AssetFilter) -> AssetResult<(Vec<Asset>, u64)>;
        async fn get_asset_content(&self, id: Uuid) -> AssetResult<(Asset, Vec<u8>)>;
        async fn get_download_url(&self, id: Uuid, ttl: Duration) -> AssetResult<String>;
    }
}
