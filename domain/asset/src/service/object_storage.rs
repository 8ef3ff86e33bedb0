use std::time::Duration;

use async_trait::async_trait;

/// Binary object storage keyed by an opaque storage key.
#[async_trait]
pub trait ObjectStorageService: Send + Sync {
    /// Write `content` under `key`, returning the object's locator.
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> anyhow::Result<String>;

    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    /// Url granting read access to `key` for `ttl`.
    async fn presign(&self, key: &str, ttl: Duration) -> anyhow::Result<String>;
}
