use std::time::Duration;

use async_trait::async_trait;
use domain_asset::service::ObjectStorageService;
use opendal::{services::S3, Operator};

use crate::infrastructure::config::StorageConfig;

fn create_s3_operator(options: &StorageConfig) -> anyhow::Result<Operator> {
    let mut builder = S3::default();
    builder
        .endpoint(options.endpoint())
        .bucket(options.bucket())
        .region(options.region())
        .access_key_id(options.access_key_id())
        .secret_access_key(options.secret_access_key());
    Ok(Operator::new(builder)?.finish())
}

/// S3 compatible object storage, minio in development.
pub struct S3ObjectStorageService {
    operator: Operator,
    /// `{endpoint}/{bucket}`, prefix of the locators handed out by `put`.
    base_url: String,
}

impl S3ObjectStorageService {
    pub fn new(options: &StorageConfig) -> anyhow::Result<Self> {
        Ok(Self {
            operator: create_s3_operator(options)?,
            base_url: format!("{}/{}", options.endpoint().trim_end_matches('/'), options.bucket()),
        })
    }
}

#[async_trait]
impl ObjectStorageService for S3ObjectStorageService {
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        self.operator.write_with(key, content).content_type(content_type).await?;
        Ok(format!("{}/{key}", self.base_url))
    }

    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        Ok(self.operator.read(key).await?)
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.operator.delete(key).await?;
        Ok(())
    }

    async fn presign(&self, key: &str, ttl: Duration) -> anyhow::Result<String> {
        Ok(self.operator.presign_read(key, ttl).await?.uri().to_string())
    }
}
