use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use abi::config::Config;
use abi::errors::Error;
use abi::model::InvitationCode;

mod redis;

pub use crate::redis::RedisCache;

#[async_trait]
pub trait Cache: Sync + Send + Debug {
    /// check whether the key exists, a failed lookup is reported as absent
    async fn exists(&self, key: &str) -> bool;

    /// resolve an invitation code mapping key to the issuer's id
    async fn resolve_inviter_id(&self, key: &str) -> Result<String, Error>;

    /// remove a consumed invitation code mapping
    async fn delete_mapping(&self, key: &str) -> Result<(), Error>;

    /// query the live invitation code of the user
    async fn get_invitation_code(&self, stu_id: &str) -> Result<Option<InvitationCode>, Error>;

    /// save the code -> user mapping and the user -> code record together
    async fn save_invitation_code(&self, stu_id: &str, code: &InvitationCode)
        -> Result<(), Error>;

    /// cached friend count, None if the user's friend list is not cached
    async fn friend_count(&self, user_id: &str) -> Result<Option<usize>, Error>;

    /// replace the cached friend list of the user
    async fn save_friend_list(&self, user_id: &str, friend_ids: &[String]) -> Result<(), Error>;

    /// add friend_id to owner_id's cached friend list, only if that list is cached
    async fn set_friend_cache_entry(&self, owner_id: &str, friend_id: &str) -> Result<(), Error>;
}

pub fn cache(config: &Config) -> Result<Arc<dyn Cache>, Error> {
    Ok(Arc::new(RedisCache::from_config(config)?))
}
