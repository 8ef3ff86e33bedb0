use async_trait::async_trait;
use chrono::Utc;
use domain_asset::{
    model::{
        entity::Asset,
        vo::{AssetFilter, AssetPatch},
    },
    repository::AssetRepo,
};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ActiveValue::*,
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, UpdateMany,
};
use uuid::Uuid;

use crate::infrastructure::database::{
    asset::{self, Column},
    OrmRepo,
};

fn live() -> Condition {
    Condition::all().add(Column::Active.eq(true)).add(Column::DeletedAt.is_null())
}

fn filter_condition(filter: &AssetFilter) -> Condition {
    let mut condition = live();
    if let Some(user_id) = &filter.user_id {
        condition = condition.add(Column::UserId.eq(user_id.to_owned()));
    }
    if let Some(content_type) = &filter.content_type {
        condition = condition.add(Column::ContentType.eq(content_type.to_owned()));
    }
    if let Some(resource_type) = &filter.resource_type {
        condition = condition.add(Column::ResourceType.eq(resource_type.to_owned()));
    }
    if let Some(resource_id) = &filter.resource_id {
        condition = condition.add(Column::ResourceId.eq(resource_id.to_owned()));
    }
    if let Some(access_level) = filter.access_level {
        condition = condition.add(Column::AccessLevel.eq(access_level.to_string()));
    }
    if let Some(secure) = filter.secure {
        condition = condition.add(Column::Secure.eq(secure));
    }
    if let Some(is_encrypted) = filter.is_encrypted {
        condition = condition.add(Column::IsEncrypted.eq(is_encrypted));
    }
    if let Some(storage_provider) = &filter.storage_provider {
        condition = condition.add(Column::StorageProvider.eq(storage_provider.to_owned()));
    }
    for tag in filter.tags.iter() {
        condition = condition.add(Expr::cust_with_values("? = ANY(tags)", [tag.to_owned()]));
    }
    condition
}

fn by_user_query(user_id: &str) -> Select<asset::Entity> {
    asset::Entity::find().filter(live().add(Column::UserId.eq(user_id)))
}

fn search_query(filter: &AssetFilter) -> Select<asset::Entity> {
    asset::Entity::find().filter(filter_condition(filter))
}

fn update_query(patch: AssetPatch, now: DateTimeWithTimeZone) -> UpdateMany<asset::Entity> {
    let id = patch.id;
    let mut model = asset::ActiveModel {
        updated_at: Set(now),
        ..Default::default()
    };
    macro_rules! set {
        ($($field:ident),*) => {
            $(if let Some(v) = patch.$field {
                model.$field = Set(v);
            })*
        };
    }
    macro_rules! set_opt {
        ($($field:ident),*) => {
            $(if let Some(v) = patch.$field {
                model.$field = Set(Some(v));
            })*
        };
    }
    set!(filename, metadata, secure, content_type, allowed_roles, is_encrypted, tags);
    set_opt!(public_url, resource_type, resource_id, user_id, encryption_key);
    if let Some(access_level) = patch.access_level {
        model.access_level = Set(access_level.to_string());
    }
    asset::Entity::update_many().set(model).filter(live().add(Column::Id.eq(id)))
}

fn soft_delete_query(id: Uuid, now: DateTimeWithTimeZone) -> UpdateMany<asset::Entity> {
    asset::Entity::update_many()
        .col_expr(Column::DeletedAt, Expr::value(now))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(live().add(Column::Id.eq(id)))
}

fn touch_query(id: Uuid, now: DateTimeWithTimeZone) -> UpdateMany<asset::Entity> {
    asset::Entity::update_many()
        .col_expr(Column::LastAccessedAt, Expr::value(now))
        .filter(live().add(Column::Id.eq(id)))
}

impl OrmRepo {
    async fn page(
        &self,
        query: Select<asset::Entity>,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<(Vec<Asset>, u64)> {
        let total = query.clone().count(&self.db).await?;
        let assets = query
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?
            .into_iter()
            .map(asset::Model::into_entity)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((assets, total))
    }
}

#[async_trait]
impl AssetRepo for OrmRepo {
    async fn create(&self, entity: &Asset) -> anyhow::Result<Asset> {
        asset::ActiveModel::from_entity(entity)?.insert(&self.db).await?.into_entity()
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Asset>> {
        asset::Entity::find_by_id(id)
            .filter(live())
            .one(&self.db)
            .await?
            .map(asset::Model::into_entity)
            .transpose()
    }

    async fn get_all_by_user_id(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<(Vec<Asset>, u64)> {
        self.page(by_user_query(user_id), limit, offset).await
    }

    async fn search(&self, filter: &AssetFilter) -> anyhow::Result<(Vec<Asset>, u64)> {
        self.page(search_query(filter), filter.limit, filter.offset).await
    }

    async fn update(&self, patch: AssetPatch) -> anyhow::Result<Option<Asset>> {
        let id = patch.id;
        let result = update_query(patch, Utc::now().into()).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = soft_delete_query(id, Utc::now().into()).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn touch(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = touch_query(id, Utc::now().into()).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use domain_asset::model::vo::AccessLevel;
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    const ACTIVE: &str = r#""active" = TRUE"#;
    const NOT_DELETED: &str = r#""deleted_at" IS NULL"#;

    fn sql(query: impl QueryTrait) -> String {
        query.build(DbBackend::Postgres).to_string()
    }

    fn assert_live_only(sql: &str) {
        assert!(sql.contains(ACTIVE), "{sql}");
        assert!(sql.contains(NOT_DELETED), "{sql}");
    }

    #[test]
    fn reads_exclude_dead_rows() {
        let id = Uuid::new_v4();
        let by_id = sql(asset::Entity::find_by_id(id).filter(live()));
        assert_live_only(&by_id);
        assert!(by_id.contains(&id.to_string()));

        let by_user = sql(by_user_query("user-a"));
        assert_live_only(&by_user);
        assert!(by_user.contains(r#""user_id" = 'user-a'"#), "{by_user}");

        assert_live_only(&sql(search_query(&AssetFilter::default())));
    }

    #[test]
    fn search_requires_every_tag() {
        let filter = AssetFilter {
            user_id: Some("user-a".to_owned()),
            access_level: Some(AccessLevel::Private),
            secure: Some(false),
            tags: vec!["avatar".to_owned(), "profile".to_owned()],
            ..Default::default()
        };
        let search = sql(search_query(&filter));
        assert_live_only(&search);
        assert_eq!(search.matches("= ANY(tags)").count(), 2, "{search}");
        assert!(search.contains("'avatar' = ANY(tags)"), "{search}");
        assert!(search.contains("'profile' = ANY(tags)"), "{search}");
        assert!(search.contains(r#""access_level" = 'private'"#), "{search}");
        assert!(search.contains(r#""secure" = FALSE"#), "{search}");

        let untagged = sql(search_query(&AssetFilter::default()));
        assert_eq!(untagged.matches("ANY(tags)").count(), 0, "{untagged}");
    }

    #[test]
    fn writes_skip_dead_rows() {
        let id = Uuid::new_v4();
        let now: DateTimeWithTimeZone = Utc::now().into();

        let patch = AssetPatch {
            filename: Some("renamed.jpg".to_owned()),
            ..AssetPatch::new(id)
        };
        let update = sql(update_query(patch, now));
        assert!(update.starts_with("UPDATE"), "{update}");
        assert_live_only(&update);
        assert!(update.contains("'renamed.jpg'"), "{update}");
        assert!(!update.contains(r#""content_type" ="#), "{update}");

        let soft_delete = sql(soft_delete_query(id, now));
        assert_live_only(&soft_delete);
        assert!(soft_delete.contains(r#""deleted_at" ="#), "{soft_delete}");

        let touch = sql(touch_query(id, now));
        assert_live_only(&touch);
        assert!(touch.contains(r#""last_accessed_at" ="#), "{touch}");
    }
}
