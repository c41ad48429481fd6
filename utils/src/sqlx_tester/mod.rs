use std::{path::Path, thread};

use sqlx::PgPool;
use tokio::runtime::Runtime;

use abi::config::PostgresConfig;

/// a throwaway database: created and migrated on construction, dropped with the value
pub struct TestDb {
    config: PostgresConfig,
}

impl TestDb {
    pub fn new(config: &PostgresConfig, migrations: impl Into<String>) -> TestDb {
        let mut config = config.clone();
        config.database = format!("test_{}", uuid::Uuid::new_v4().simple());
        let tdb = TestDb { config };

        let server_url = tdb.config.server_url();
        let url = tdb.url();
        let dbname = tdb.dbname().to_string();
        let migrations = migrations.into();
        // sqlx needs a runtime, and the caller may already be inside one
        thread::spawn(move || {
            Runtime::new().unwrap().block_on(async move {
                let conn = PgPool::connect(&server_url).await.unwrap();
                sqlx::query(&format!(r#"CREATE DATABASE "{dbname}""#))
                    .execute(&conn)
                    .await
                    .unwrap();

                let conn = PgPool::connect(&url).await.unwrap();
                sqlx::migrate::Migrator::new(Path::new(&migrations))
                    .await
                    .unwrap()
                    .run(&conn)
                    .await
                    .unwrap();
            });
        })
        .join()
        .unwrap();
        tdb
    }

    pub fn url(&self) -> String {
        self.config.url()
    }

    pub fn dbname(&self) -> &str {
        &self.config.database
    }

    pub async fn pool(&self) -> PgPool {
        PgPool::connect(&self.url()).await.unwrap()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let server_url = self.config.server_url();
        let dbname = self.config.database.clone();
        thread::spawn(move || {
            Runtime::new().unwrap().block_on(async move {
                let conn = PgPool::connect(&server_url).await.unwrap();
                // close other connections
                sqlx::query(&format!(r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{dbname}' AND pid <> pg_backend_pid()"#))
                    .execute(&conn)
                    .await
                    .unwrap();
                sqlx::query(&format!(r#"DROP DATABASE "{dbname}""#))
                    .execute(&conn)
                    .await
                    .unwrap();
            });
        })
        .join()
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use abi::config::Config;

    use super::TestDb;

    #[tokio::test]
    #[ignore = "needs a running postgres server"]
    async fn test_db_should_be_migrated() {
        let config = Config::load("../abi/fixtures/config.yml").unwrap();
        let tdb = TestDb::new(&config.db.postgres, "../db/migrations");
        assert!(tdb.dbname().starts_with("test_"));
        sqlx::query("INSERT INTO follow_relations (follower_id, followed_id, create_time) VALUES ('1', '2', 0)")
            .execute(&tdb.pool().await)
            .await
            .unwrap();
    }
}
