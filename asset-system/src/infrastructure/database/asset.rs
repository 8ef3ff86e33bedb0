use std::str::FromStr;

use chrono::Utc;
use domain_asset::model::{entity::Asset, vo::AccessLevel};
use sea_orm::{entity::prelude::*, ActiveValue::Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub url: String,
    pub public_url: Option<String>,
    pub filename: String,
    pub file_size: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,
    pub secure: bool,
    #[sea_orm(unique)]
    pub storage_key: String,
    pub storage_provider: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub content_type: String,
    pub user_id: Option<String>,
    pub access_level: String,
    pub allowed_roles: Vec<String>,
    pub is_encrypted: bool,
    pub encryption_key: Option<String>,
    pub last_accessed_at: Option<DateTimeWithTimeZone>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub tags: Vec<String>,
    pub file_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_entity(self) -> anyhow::Result<Asset> {
        Ok(Asset {
            id: self.id,
            url: self.url,
            public_url: self.public_url,
            filename: self.filename,
            file_size: u64::try_from(self.file_size)?,
            metadata: self.metadata,
            secure: self.secure,
            storage_key: self.storage_key,
            storage_provider: self.storage_provider,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            content_type: self.content_type,
            user_id: self.user_id,
            access_level: AccessLevel::from_str(&self.access_level)?,
            allowed_roles: self.allowed_roles,
            is_encrypted: self.is_encrypted,
            encryption_key: self.encryption_key,
            last_accessed_at: self.last_accessed_at.map(|t| t.with_timezone(&Utc)),
            deleted_at: self.deleted_at.map(|t| t.with_timezone(&Utc)),
            tags: self.tags,
            file_hash: self.file_hash,
            created_at: self.created_at.with_timezone(&Utc),
            updated_at: self.updated_at.with_timezone(&Utc),
            active: self.active,
        })
    }
}

impl ActiveModel {
    pub fn from_entity(asset: &Asset) -> anyhow::Result<Self> {
        Ok(Self {
            id: Set(asset.id),
            url: Set(asset.url.to_owned()),
            public_url: Set(asset.public_url.to_owned()),
            filename: Set(asset.filename.to_owned()),
            file_size: Set(i64::try_from(asset.file_size)?),
            metadata: Set(asset.metadata.to_owned()),
            secure: Set(asset.secure),
            storage_key: Set(asset.storage_key.to_owned()),
            storage_provider: Set(asset.storage_provider.to_owned()),
            resource_type: Set(asset.resource_type.to_owned()),
            resource_id: Set(asset.resource_id.to_owned()),
            content_type: Set(asset.content_type.to_owned()),
            user_id: Set(asset.user_id.to_owned()),
            access_level: Set(asset.access_level.to_string()),
            allowed_roles: Set(asset.allowed_roles.to_owned()),
            is_encrypted: Set(asset.is_encrypted),
            encryption_key: Set(asset.encryption_key.to_owned()),
            last_accessed_at: Set(asset.last_accessed_at.map(Into::into)),
            deleted_at: Set(asset.deleted_at.map(Into::into)),
            tags: Set(asset.tags.to_owned()),
            file_hash: Set(asset.file_hash.to_owned()),
            created_at: Set(asset.created_at.into()),
            updated_at: Set(asset.updated_at.into()),
            active: Set(asset.active),
        })
    }
}
