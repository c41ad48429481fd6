use tracing::{debug, error, info};

use abi::errors::{Error, ErrorKind};
use abi::model::code_mapping_key;

use super::UserService;

impl UserService {
    /// Redeem an invitation code: create the relation `stu_id -> issuer`.
    ///
    /// The relation existence check and the insert do not hold a lock between them, two
    /// concurrent binds of the same pair may both pass the check. The unique constraint on
    /// the relation pair rejects the later insert, which surfaces as `RelationCreateFailed`.
    ///
    /// After the relation is stored the friend list caches are updated and the consumed code
    /// mapping is removed by a detached task. The call returns without awaiting it, the task
    /// outlives the request and is never cancelled; its failures are logged and dropped.
    pub async fn bind_invitation(&self, stu_id: &str, code: &str) -> Result<(), Error> {
        let key = code_mapping_key(code);
        if !self.cache.exists(&key).await {
            return Err(Error::invalid_invitation_code(code));
        }

        let friend_id = self.cache.resolve_inviter_id(&key).await.map_err(|e| {
            Error::wrap(
                ErrorKind::CacheLookupFailed,
                format!("resolve invitation code {code}"),
                e,
            )
        })?;
        if friend_id == stu_id {
            return Err(Error::self_binding());
        }

        let relation = self
            .relation
            .find_relation(stu_id, &friend_id)
            .await
            .map_err(|e| {
                Error::wrap(
                    ErrorKind::RelationLookupFailed,
                    format!("find relation {stu_id} -> {friend_id}"),
                    e,
                )
            })?;
        if relation.is_some() {
            return Err(Error::relation_exists(stu_id, &friend_id));
        }

        self.ensure_not_confined(stu_id).await?;
        self.ensure_not_confined(&friend_id).await?;

        self.relation
            .create_relation(stu_id, &friend_id)
            .await
            .map_err(|e| {
                Error::wrap(
                    ErrorKind::RelationCreateFailed,
                    format!("create relation {stu_id} -> {friend_id}"),
                    e,
                )
            })?;
        info!("{} bound to {} by invitation code {}", stu_id, friend_id, code);

        self.spawn_cache_update(stu_id.to_string(), friend_id, key);
        Ok(())
    }

    async fn ensure_not_confined(&self, user_id: &str) -> Result<(), Error> {
        let confined = self.policy.is_confined(user_id).await.map_err(|e| {
            Error::wrap(
                ErrorKind::ConfinementCheckFailed {
                    user_id: user_id.to_string(),
                },
                format!("check friend count of {user_id}"),
                e,
            )
        })?;
        if confined {
            return Err(Error::friend_list_full(user_id));
        }
        Ok(())
    }

    fn spawn_cache_update(&self, stu_id: String, friend_id: String, key: String) {
        let cache = self.cache.clone();
        // the handle is dropped: nobody joins or aborts this task
        tokio::spawn(async move {
            if let Err(e) = cache.set_friend_cache_entry(&friend_id, &stu_id).await {
                error!("set friend cache of {} failed: {}", friend_id, e);
            }
            if let Err(e) = cache.set_friend_cache_entry(&stu_id, &friend_id).await {
                error!("set friend cache of {} failed: {}", stu_id, e);
            }
            if let Err(e) = cache.delete_mapping(&key).await {
                error!("remove code mapping {} failed: {}", key, e);
                return;
            }
            debug!("code mapping {} consumed", key);
        });
    }
}
