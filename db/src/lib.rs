use std::path::Path;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use abi::config::Config;
use abi::errors::Error;

mod postgres;
pub mod relation;
pub mod user;

pub use relation::RelationRepo;
pub use user::UserRepo;

/// holds every repository the user service needs, all sharing one pool
#[derive(Debug, Clone)]
pub struct DbRepo {
    pub relation: Arc<dyn RelationRepo>,
    pub user: Arc<dyn UserRepo>,
}

impl DbRepo {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db.postgres.max_connections)
            .connect(&config.db.postgres.url())
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let relation = Arc::new(postgres::PostgresRelation::new(pool.clone()));
        let user = Arc::new(postgres::PostgresUser::new(pool));
        Self { relation, user }
    }
}

/// run the migrations under `db.postgres.migrations`
pub async fn migrate(config: &Config) -> Result<(), Error> {
    let pool = PgPool::connect(&config.db.postgres.url()).await?;
    let migrations = &config.db.postgres.migrations;
    info!("run migrations from {}", migrations);
    sqlx::migrate::Migrator::new(Path::new(migrations))
        .await?
        .run(&pool)
        .await?;
    Ok(())
}
