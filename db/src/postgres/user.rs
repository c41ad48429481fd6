use async_trait::async_trait;
use sqlx::PgPool;

use abi::errors::Result;
use abi::model::UserInfo;

use crate::user::UserRepo;

#[derive(Debug)]
pub struct PostgresUser {
    pool: PgPool,
}

impl PostgresUser {
    pub fn new(pool: PgPool) -> Self {
        PostgresUser { pool }
    }
}

#[async_trait]
impl UserRepo for PostgresUser {
    async fn get_user_by_id(&self, stu_id: &str) -> Result<Option<UserInfo>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE stu_id = $1")
            .bind(stu_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
