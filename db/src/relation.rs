use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::FriendRelation;

#[async_trait]
pub trait RelationRepo: Send + Sync + Debug {
    /// find the directed relation user_id -> friend_id
    async fn find_relation(&self, user_id: &str, friend_id: &str)
        -> Result<Option<FriendRelation>>;

    /// create the relation user_id -> friend_id;
    /// the (follower_id, followed_id) pair is unique, a duplicate insert fails with Conflict
    async fn create_relation(&self, user_id: &str, friend_id: &str) -> Result<()>;

    /// distinct friend ids of the user, whichever side created the relation
    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>>;
}
