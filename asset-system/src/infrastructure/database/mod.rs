pub mod asset;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct OrmRepo {
    pub db: DatabaseConnection,
}

impl OrmRepo {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        Ok(Self::builder().db(Database::connect(url).await?).build())
    }

    /// Create the tables this system owns when they don't exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        let stmt = Schema::new(backend)
            .create_table_from_entity(asset::Entity)
            .if_not_exists()
            .to_owned();
        self.db.execute(backend.build(&stmt)).await?;
        Ok(())
    }
}
