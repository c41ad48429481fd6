use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use abi::errors::Error;
use cache::Cache;
use db::RelationRepo;

#[async_trait]
pub trait FriendCountPolicy: Send + Sync + Debug {
    /// true when the user has reached the maximum permitted friend count
    async fn is_confined(&self, user_id: &str) -> Result<bool, Error>;
}

/// counts friends from the cached friend list,
/// falling back to the relation store and re-caching when the list is not cached
#[derive(Debug)]
pub struct CachedFriendCount {
    cache: Arc<dyn Cache>,
    relation: Arc<dyn RelationRepo>,
    max_friends: usize,
}

impl CachedFriendCount {
    pub fn new(cache: Arc<dyn Cache>, relation: Arc<dyn RelationRepo>, max_friends: usize) -> Self {
        Self {
            cache,
            relation,
            max_friends,
        }
    }

    async fn friend_count(&self, user_id: &str) -> Result<usize, Error> {
        if let Some(count) = self.cache.friend_count(user_id).await? {
            return Ok(count);
        }

        let friend_ids = self.relation.friend_ids(user_id).await?;
        debug!("load {} friends of {} from db", friend_ids.len(), user_id);
        if let Err(e) = self.cache.save_friend_list(user_id, &friend_ids).await {
            warn!("cache friend list of {} failed: {}", user_id, e);
        }
        Ok(friend_ids.len())
    }
}

#[async_trait]
impl FriendCountPolicy for CachedFriendCount {
    async fn is_confined(&self, user_id: &str) -> Result<bool, Error> {
        let count = self.friend_count(user_id).await?;
        Ok(count >= self.max_friends)
    }
}
