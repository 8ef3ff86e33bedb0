use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use domain_asset::{
    command::CreateAssetCommand,
    model::{
        entity::Asset,
        event::{DomainEvent, EventType, UserAvatarUpdated, UserCreated},
        vo::{AccessLevel, AssetFilter},
    },
    service::{AssetService, EventContext, EventHandler, EventPublisher},
};
use typed_builder::TypedBuilder;

use crate::DEFAULT_AVATAR;

const AVATAR_FILENAME: &str = "avatar.png";
const AVATAR_CONTENT_TYPE: &str = "image/png";
const AVATAR_TAG: &str = "avatar";
const USERS_RESOURCE: &str = "users";

/// Gives every new user a default avatar and announces it with `user_avatar_updated`.
#[derive(TypedBuilder)]
pub struct UserCreatedHandler {
    asset_service: Arc<dyn AssetService>,
    event_publisher: Arc<dyn EventPublisher>,
    /// Topic receiving `user_avatar_updated`.
    #[builder(setter(into))]
    assets_topic: String,
    #[builder(default = DEFAULT_AVATAR.to_vec())]
    avatar: Vec<u8>,
}

impl UserCreatedHandler {
    /// Avatar left by an earlier delivery of the same event.
    async fn existing_avatar(&self, user_id: &str) -> anyhow::Result<Option<Asset>> {
        let filter = AssetFilter {
            user_id: Some(user_id.to_owned()),
            resource_type: Some(USERS_RESOURCE.to_owned()),
            resource_id: Some(user_id.to_owned()),
            tags: vec![AVATAR_TAG.to_owned()],
            limit: 1,
            ..Default::default()
        };
        let (found, _) = self.asset_service.search_assets(filter).await?;
        Ok(found.into_iter().next())
    }

    async fn upload_avatar(&self, user_id: &str) -> anyhow::Result<Asset> {
        let command = CreateAssetCommand {
            filename: AVATAR_FILENAME.to_owned(),
            content_type: AVATAR_CONTENT_TYPE.to_owned(),
            user_id: Some(user_id.to_owned()),
            resource_type: Some(USERS_RESOURCE.to_owned()),
            resource_id: Some(user_id.to_owned()),
            access_level: AccessLevel::Public,
            tags: vec![AVATAR_TAG.to_owned()],
            metadata: Some(serde_json::json!({ "description": "Welcome avatar for new user" })),
            ..Default::default()
        };
        Ok(self.asset_service.upload_asset(command, self.avatar.to_owned()).await?)
    }
}

#[async_trait]
impl EventHandler for UserCreatedHandler {
    async fn handle(&self, ctx: &EventContext, event: &DomainEvent) -> anyhow::Result<()> {
        let payload: UserCreated = if event.data.is_null() {
            UserCreated::default()
        } else {
            serde_json::from_value(event.data.to_owned())
                .with_context(|| format!("Malformed user_created payload in event: {}", event.id))?
        };
        let user_id = payload.user_id.as_str();
        if user_id.is_empty() {
            tracing::debug!(
                event_id = %event.id,
                aggregate_id = %event.aggregate_id,
                topic = %ctx.topic,
                "user_created without user id, skipped."
            );
            return Ok(());
        }

        let asset = match self.existing_avatar(user_id).await? {
            Some(asset) => {
                tracing::info!(user_id, asset_id = %asset.id, "Avatar already exists.");
                asset
            }
            None => self.upload_avatar(user_id).await?,
        };

        let data = serde_json::to_value(UserAvatarUpdated {
            user_id: user_id.to_owned(),
            asset_id: asset.id,
            avatar_url: asset.public_url.unwrap_or(asset.url),
        })?;
        let derived = DomainEvent::new(EventType::user_avatar_updated(), user_id, data)
            .caused_by(event)
            .with_user(user_id);
        self.event_publisher
            .publish(&self.assets_topic, &derived)
            .await
            .context("Failed to publish user_avatar_updated.")?;
        tracing::info!(user_id, asset_id = %asset.id, "Default avatar assigned.");
        Ok(())
    }
}
