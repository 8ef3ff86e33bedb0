use std::time::Duration;

use async_trait::async_trait;

/// Key-value cache with expiry.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Store `value` under `key`. `None` ttl never expires.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> anyhow::Result<()>;

    /// `None` on a miss.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}
