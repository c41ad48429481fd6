use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use abi::errors::Result;
use abi::model::FriendRelation;

use crate::relation::RelationRepo;

/// relation status for a normal (not deleted) relation
const RELATION_NORMAL: i16 = 0;

#[derive(Debug)]
pub struct PostgresRelation {
    pool: PgPool,
}

impl PostgresRelation {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationRepo for PostgresRelation {
    async fn find_relation(
        &self,
        user_id: &str,
        friend_id: &str,
    ) -> Result<Option<FriendRelation>> {
        let relation = sqlx::query_as(
            "SELECT * FROM follow_relations
             WHERE follower_id = $1 AND followed_id = $2 AND status = $3",
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(RELATION_NORMAL)
        .fetch_optional(&self.pool)
        .await?;
        Ok(relation)
    }

    async fn create_relation(&self, user_id: &str, friend_id: &str) -> Result<()> {
        let relation = FriendRelation::new(user_id, friend_id);
        debug!("create relation: {:?}", relation);
        sqlx::query(
            "INSERT INTO follow_relations (follower_id, followed_id, status, create_time)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&relation.follower_id)
        .bind(&relation.followed_id)
        .bind(RELATION_NORMAL)
        .bind(relation.create_time)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT followed_id FROM follow_relations WHERE follower_id = $1 AND status = $2
             UNION
             SELECT follower_id FROM follow_relations WHERE followed_id = $1 AND status = $2",
        )
        .bind(user_id)
        .bind(RELATION_NORMAL)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;

    use abi::config::Config;
    use abi::errors::ErrorKind;
    use utils::sqlx_tester::TestDb;

    use super::*;

    struct TestRelation {
        repo: PostgresRelation,
        _tdb: TestDb,
    }

    impl Deref for TestRelation {
        type Target = PostgresRelation;
        fn deref(&self) -> &Self::Target {
            &self.repo
        }
    }

    impl TestRelation {
        async fn new() -> Self {
            let config = Config::load("../abi/fixtures/config.yml").unwrap();
            let tdb = TestDb::new(&config.db.postgres, "./migrations");
            let repo = PostgresRelation::new(tdb.pool().await);
            Self { repo, _tdb: tdb }
        }
    }

    #[tokio::test]
    #[ignore = "needs a running postgres server"]
    async fn create_and_find_relation_should_work() {
        let repo = TestRelation::new().await;
        assert!(repo
            .find_relation("102300217", "102300218")
            .await
            .unwrap()
            .is_none());

        repo.create_relation("102300217", "102300218").await.unwrap();
        let relation = repo
            .find_relation("102300217", "102300218")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(relation.follower_id, "102300217");
        assert_eq!(relation.followed_id, "102300218");

        // only the forward edge exists
        assert!(repo
            .find_relation("102300218", "102300217")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    #[ignore = "needs a running postgres server"]
    async fn duplicate_relation_should_conflict() {
        let repo = TestRelation::new().await;
        repo.create_relation("102300217", "102300218").await.unwrap();
        let err = repo
            .create_relation("102300217", "102300218")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Conflict);
    }

    #[tokio::test]
    #[ignore = "needs a running postgres server"]
    async fn friend_ids_should_cover_both_directions() {
        let repo = TestRelation::new().await;
        repo.create_relation("1", "2").await.unwrap();
        repo.create_relation("3", "1").await.unwrap();
        repo.create_relation("2", "1").await.unwrap();

        let mut ids = repo.friend_ids("1").await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["2".to_string(), "3".to_string()]);
    }
}
