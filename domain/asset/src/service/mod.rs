mod asset;
mod cache;
mod event;
mod object_storage;

#[rustfmt::skip]
pub use {
    asset::AssetService,
    cache::CacheService,
    event::{EventConsumer, EventContext, EventHandler, EventPublisher},
    object_storage::ObjectStorageService,
};
