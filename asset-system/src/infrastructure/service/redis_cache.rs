use std::time::Duration;

use async_trait::async_trait;
use domain_asset::service::CacheService;
use redis::{aio::ConnectionManager, Client};

/// Cache over a single redis node. The connection reconnects on its own.
#[derive(Clone)]
pub struct RedisCacheService {
    connection: ConnectionManager,
}

impl RedisCacheService {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            connection: ConnectionManager::new(client).await?,
        })
    }
}

#[async_trait]
impl CacheService for RedisCacheService {
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> anyhow::Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(u64::try_from(ttl.as_millis())?.max(1));
        }
        cmd.query_async::<_, ()>(&mut self.connection.clone()).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(redis::cmd("GET").arg(key).query_async(&mut self.connection.clone()).await?)
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        redis::cmd("DEL").arg(key).query_async::<_, ()>(&mut self.connection.clone()).await?;
        Ok(())
    }
}
