use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};

use abi::config::Config;
use abi::errors::Error;
use abi::model::{code_mapping_key, InvitationCode};

use crate::Cache;

/// user id -> current invitation code, stored as a hash
const USER_INVITATION_PREFIX: &str = "user_invitation";

/// user id -> friend id set
const USER_FRIENDS_PREFIX: &str = "user_friends";

/// add a member to a set only when the set already exists
const SADD_IF_EXISTS: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('SADD', KEYS[1], ARGV[1])
    redis.call('EXPIRE', KEYS[1], ARGV[2])
    return 1
end
return 0
";

#[derive(Debug)]
pub struct RedisCache {
    client: redis::Client,
    code_expire: u64,
    friend_cache_expire: u64,
}

impl RedisCache {
    pub fn new(client: redis::Client, code_expire: u64, friend_cache_expire: u64) -> Self {
        Self {
            client,
            code_expire,
            friend_cache_expire,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = redis::Client::open(config.redis.url())?;
        Ok(RedisCache::new(
            client,
            config.invitation.code_expire,
            config.invitation.friend_cache_expire,
        ))
    }

    fn user_invitation_key(stu_id: &str) -> String {
        format!("{}:{}", USER_INVITATION_PREFIX, stu_id)
    }

    fn user_friends_key(user_id: &str) -> String {
        format!("{}:{}", USER_FRIENDS_PREFIX, user_id)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn exists(&self, key: &str) -> bool {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("check key {} exists, get connection failed: {}", key, e);
                return false;
            }
        };
        match conn.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("check key {} exists failed: {}", key, e);
                false
            }
        }
    }

    async fn resolve_inviter_id(&self, key: &str) -> Result<String, Error> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let stu_id: Option<String> = conn.get(key).await?;
        // the mapping may expire between the existence check and this read
        stu_id.ok_or_else(|| Error::not_found_with_details(format!("code mapping {key}")))
    }

    async fn delete_mapping(&self, key: &str) -> Result<(), Error> {
        debug!("delete code mapping: {}", key);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn get_invitation_code(&self, stu_id: &str) -> Result<Option<InvitationCode>, Error> {
        let key = Self::user_invitation_key(stu_id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut fields: HashMap<String, String> = conn.hgetall(&key).await?;

        let (Some(code), Some(created_at)) = (fields.remove("code"), fields.remove("created_at"))
        else {
            return Ok(None);
        };
        let created_at = created_at
            .parse()
            .map_err(|_| Error::internal_with_details(format!("bad created_at in {key}")))?;
        Ok(Some(InvitationCode { code, created_at }))
    }

    async fn save_invitation_code(
        &self,
        stu_id: &str,
        code: &InvitationCode,
    ) -> Result<(), Error> {
        let mapping_key = code_mapping_key(&code.code);
        let user_key = Self::user_invitation_key(stu_id);
        let created_at = code.created_at.to_string();
        debug!("save invitation code {} for {}", code.code, stu_id);

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .set_ex(&mapping_key, stu_id, self.code_expire)
            .ignore()
            .hset_multiple(
                &user_key,
                &[("code", code.code.as_str()), ("created_at", created_at.as_str())],
            )
            .ignore()
            .expire(&user_key, self.code_expire as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn friend_count(&self, user_id: &str) -> Result<Option<usize>, Error> {
        let key = Self::user_friends_key(user_id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let exists: bool = conn.exists(&key).await?;
        if !exists {
            return Ok(None);
        }
        let count: usize = conn.scard(&key).await?;
        Ok(Some(count))
    }

    async fn save_friend_list(&self, user_id: &str, friend_ids: &[String]) -> Result<(), Error> {
        let key = Self::user_friends_key(user_id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic().del(&key).ignore();
        // redis has no empty set, an empty list stays uncached
        if !friend_ids.is_empty() {
            pipe.sadd(&key, friend_ids)
                .ignore()
                .expire(&key, self.friend_cache_expire as i64)
                .ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn set_friend_cache_entry(&self, owner_id: &str, friend_id: &str) -> Result<(), Error> {
        let key = Self::user_friends_key(owner_id);
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let added: i64 = redis::Script::new(SADD_IF_EXISTS)
            .key(&key)
            .arg(friend_id)
            .arg(self.friend_cache_expire)
            .invoke_async(&mut conn)
            .await?;
        if added == 0 {
            debug!("friend list of {} is not cached, skip adding {}", owner_id, friend_id);
        }
        Ok(())
    }
}
