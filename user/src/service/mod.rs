use std::sync::Arc;

use abi::config::Config;
use abi::errors::Error;
use cache::Cache;
use db::{DbRepo, RelationRepo, UserRepo};

use crate::policy::{CachedFriendCount, FriendCountPolicy};

mod bind_friend;
mod invitation;
mod profile;

/// user service; stateless apart from its shared collaborators,
/// so one instance serves concurrent requests
#[derive(Debug, Clone)]
pub struct UserService {
    cache: Arc<dyn Cache>,
    relation: Arc<dyn RelationRepo>,
    user: Arc<dyn UserRepo>,
    policy: Arc<dyn FriendCountPolicy>,
    code_len: usize,
}

impl UserService {
    pub fn new(
        cache: Arc<dyn Cache>,
        relation: Arc<dyn RelationRepo>,
        user: Arc<dyn UserRepo>,
        policy: Arc<dyn FriendCountPolicy>,
        code_len: usize,
    ) -> Self {
        Self {
            cache,
            relation,
            user,
            policy,
            code_len,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        let cache = cache::cache(config)?;
        let db = DbRepo::new(config).await?;
        let policy = Arc::new(CachedFriendCount::new(
            cache.clone(),
            db.relation.clone(),
            config.invitation.max_friends,
        ));
        Ok(Self::new(
            cache,
            db.relation,
            db.user,
            policy,
            config.invitation.code_len,
        ))
    }
}
