mod redis_cache;
mod s3_storage;

#[rustfmt::skip]
pub use {
    redis_cache::RedisCacheService,
    s3_storage::S3ObjectStorageService,
};
