use std::{sync::Arc, time::Duration};

use anyhow::Context;
use domain_asset::{
    model::event::EventType,
    service::{AssetService, EventConsumer, EventHandler, EventPublisher},
};
use infrastructure_message_queue::{
    EventDispatcher, KafkaEventPublisher, KafkaMessageReader, MessageReader,
};
use service_asset::{AssetServiceImpl, UserCreatedHandler, DEFAULT_AVATAR};

use super::{
    config::AssetSystemConfig,
    database::OrmRepo,
    service::{RedisCacheService, S3ObjectStorageService},
};

/// Everything the process runs, wired from [`AssetSystemConfig`].
pub struct ServiceProvider {
    dispatcher: Arc<EventDispatcher>,
    user_created_handler: Arc<dyn EventHandler>,
}

impl ServiceProvider {
    pub async fn build(config: AssetSystemConfig) -> anyhow::Result<Self> {
        let orm_repo = OrmRepo::connect(config.db().url())
            .await
            .context("Cannot connect to database.")?;
        if *config.db().auto_migrate() {
            orm_repo.ensure_schema().await.context("Cannot create asset schema.")?;
        }
        let cache = RedisCacheService::connect(config.redis().url())
            .await
            .context("Cannot connect to redis.")?;
        let storage = S3ObjectStorageService::new(config.storage())
            .context("Cannot build object storage operator.")?;

        let mq = config.mq();
        let topics = mq.topics();
        let event_publisher: Arc<dyn EventPublisher> =
            Arc::new(KafkaEventPublisher::new(mq.client_options())?);

        let asset_service: Arc<dyn AssetService> = Arc::new(
            AssetServiceImpl::builder()
                .asset_repo(Arc::new(orm_repo))
                .object_storage(Arc::new(storage))
                .cache_service(Arc::new(cache))
                .event_publisher(event_publisher.clone())
                .activity_topic(topics.activity_logs())
                .cache_ttl(Duration::from_secs(*config.redis().exp_secs()))
                .storage_provider(config.storage().provider())
                .public_url_prefix(config.storage().public_url_prefix())
                .build(),
        );

        let avatar = match config.avatar().path() {
            Some(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("Cannot read avatar: {path}."))?,
            None => DEFAULT_AVATAR.to_vec(),
        };
        let user_created_handler: Arc<dyn EventHandler> = Arc::new(
            UserCreatedHandler::builder()
                .asset_service(asset_service)
                .event_publisher(event_publisher)
                .assets_topic(topics.assets_events())
                .avatar(avatar)
                .build(),
        );

        let readers: Vec<Box<dyn MessageReader>> = vec![Box::new(KafkaMessageReader::new(
            mq.client_options(),
            mq.group_id(),
            topics.users_events(),
        )?)];
        let dispatcher = Arc::new(
            EventDispatcher::builder()
                .readers(readers)
                .retry(mq.retry().policy())
                .drain_timeout(mq.shutdown_timeout())
                .build(),
        );

        Ok(Self {
            dispatcher,
            user_created_handler,
        })
    }

    /// Attach handlers to the dispatcher and start consuming.
    pub async fn start_consumers(&self) -> anyhow::Result<()> {
        self.dispatcher
            .register_handler(EventType::user_created(), self.user_created_handler.clone())?;
        self.dispatcher.start().await?;
        Ok(())
    }

    pub async fn stop_consumers(&self) -> anyhow::Result<()> {
        self.dispatcher.stop().await?;
        Ok(())
    }
}
