//! In-memory collaborators recording how the service calls them.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use abi::errors::{Error, ErrorKind, Result};
use abi::model::{code_mapping_key, FriendRelation, InvitationCode, UserInfo};
use cache::Cache;
use db::{RelationRepo, UserRepo};

use crate::FriendCountPolicy;

#[derive(Debug, Default)]
pub struct FakeCache {
    mappings: Mutex<HashMap<String, String>>,
    codes: Mutex<HashMap<String, InvitationCode>>,
    friends: Mutex<HashMap<String, HashSet<String>>>,
    friend_entries: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<String>>,
    delete_tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    fail_resolve: bool,
    fail_background: bool,
    fail_friend_count: bool,
}

impl FakeCache {
    /// map `code` to its issuer
    pub fn with_mapping(self, code: &str, stu_id: &str) -> Self {
        self.mappings
            .lock()
            .unwrap()
            .insert(code_mapping_key(code), stu_id.to_string());
        self
    }

    /// issue `code` for `stu_id`, as the code issuance does
    pub fn with_code(self, stu_id: &str, code: &str, created_at: i64) -> Self {
        let code = InvitationCode {
            code: code.to_string(),
            created_at,
        };
        self.codes.lock().unwrap().insert(stu_id.to_string(), code);
        self
    }

    pub fn with_friends(self, user_id: &str, friend_ids: &[&str]) -> Self {
        let set = friend_ids.iter().map(|id| id.to_string()).collect();
        self.friends.lock().unwrap().insert(user_id.to_string(), set);
        self
    }

    pub fn failing_resolve(mut self) -> Self {
        self.fail_resolve = true;
        self
    }

    /// friend cache updates and mapping removal fail
    pub fn failing_background(mut self) -> Self {
        self.fail_background = true;
        self
    }

    pub fn failing_friend_count(mut self) -> Self {
        self.fail_friend_count = true;
        self
    }

    /// the first friend cache update waits until the returned handle is notified
    pub fn gated(self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        (self, gate)
    }

    /// receives every key passed to `delete_mapping`, after the call has been handled
    pub fn watch_deletes(&self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.delete_tx.lock().unwrap() = Some(tx);
        rx
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn friend_entries(&self) -> Vec<(String, String)> {
        self.friend_entries.lock().unwrap().clone()
    }

    pub fn cached_friends(&self, user_id: &str) -> Option<Vec<String>> {
        self.friends
            .lock()
            .unwrap()
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
    }

    pub fn mapping(&self, code: &str) -> Option<String> {
        self.mappings
            .lock()
            .unwrap()
            .get(&code_mapping_key(code))
            .cloned()
    }

    fn cache_error() -> Error {
        Error::with_details(ErrorKind::RedisError, "cache unavailable")
    }
}

#[async_trait]
impl Cache for FakeCache {
    async fn exists(&self, key: &str) -> bool {
        self.mappings.lock().unwrap().contains_key(key)
    }

    async fn resolve_inviter_id(&self, key: &str) -> Result<String> {
        if self.fail_resolve {
            return Err(Self::cache_error());
        }
        self.mappings
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(Error::not_found)
    }

    async fn delete_mapping(&self, key: &str) -> Result<()> {
        let result = if self.fail_background {
            Err(Self::cache_error())
        } else {
            self.mappings.lock().unwrap().remove(key);
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        };
        if let Some(tx) = self.delete_tx.lock().unwrap().as_ref() {
            let _ = tx.send(key.to_string());
        }
        result
    }

    async fn get_invitation_code(&self, stu_id: &str) -> Result<Option<InvitationCode>> {
        Ok(self.codes.lock().unwrap().get(stu_id).cloned())
    }

    async fn save_invitation_code(&self, stu_id: &str, code: &InvitationCode) -> Result<()> {
        self.mappings
            .lock()
            .unwrap()
            .insert(code_mapping_key(&code.code), stu_id.to_string());
        self.codes
            .lock()
            .unwrap()
            .insert(stu_id.to_string(), code.clone());
        Ok(())
    }

    async fn friend_count(&self, user_id: &str) -> Result<Option<usize>> {
        if self.fail_friend_count {
            return Err(Self::cache_error());
        }
        Ok(self.friends.lock().unwrap().get(user_id).map(HashSet::len))
    }

    async fn save_friend_list(&self, user_id: &str, friend_ids: &[String]) -> Result<()> {
        let set = friend_ids.iter().cloned().collect();
        self.friends.lock().unwrap().insert(user_id.to_string(), set);
        Ok(())
    }

    async fn set_friend_cache_entry(&self, owner_id: &str, friend_id: &str) -> Result<()> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_background {
            return Err(Self::cache_error());
        }
        self.friend_entries
            .lock()
            .unwrap()
            .push((owner_id.to_string(), friend_id.to_string()));
        if let Some(set) = self.friends.lock().unwrap().get_mut(owner_id) {
            set.insert(friend_id.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeRelation {
    relations: Mutex<HashSet<(String, String)>>,
    created: Mutex<Vec<(String, String)>>,
    find_calls: AtomicUsize,
    fail_find: bool,
    fail_create: bool,
    stale_find: bool,
}

impl FakeRelation {
    pub fn with_relation(self, user_id: &str, friend_id: &str) -> Self {
        self.relations
            .lock()
            .unwrap()
            .insert((user_id.to_string(), friend_id.to_string()));
        self
    }

    pub fn failing_find(mut self) -> Self {
        self.fail_find = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// find never sees existing relations, as when a concurrent bind commits
    /// between the check and the insert
    pub fn stale_find(mut self) -> Self {
        self.stale_find = true;
        self
    }

    pub fn created(&self) -> Vec<(String, String)> {
        self.created.lock().unwrap().clone()
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationRepo for FakeRelation {
    async fn find_relation(
        &self,
        user_id: &str,
        friend_id: &str,
    ) -> Result<Option<FriendRelation>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find {
            return Err(Error::with_details(ErrorKind::DbError, "invalid data"));
        }
        if self.stale_find {
            return Ok(None);
        }
        let key = (user_id.to_string(), friend_id.to_string());
        let found = self.relations.lock().unwrap().contains(&key);
        Ok(found.then(|| FriendRelation::new(user_id, friend_id)))
    }

    async fn create_relation(&self, user_id: &str, friend_id: &str) -> Result<()> {
        let key = (user_id.to_string(), friend_id.to_string());
        self.created.lock().unwrap().push(key.clone());
        if self.fail_create {
            return Err(Error::with_details(ErrorKind::DbError, "invalid data"));
        }
        if !self.relations.lock().unwrap().insert(key) {
            return Err(Error::conflict("duplicate key violates unique_follow_relation"));
        }
        Ok(())
    }

    async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let ids: HashSet<String> = self
            .relations
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(a, b)| {
                if a == user_id {
                    Some(b.clone())
                } else if b == user_id {
                    Some(a.clone())
                } else {
                    None
                }
            })
            .collect();
        Ok(ids.into_iter().collect())
    }
}

#[derive(Debug, Default)]
pub struct FakePolicy {
    confined: HashSet<String>,
    failing: HashSet<String>,
}

impl FakePolicy {
    pub fn confined(mut self, user_id: &str) -> Self {
        self.confined.insert(user_id.to_string());
        self
    }

    pub fn failing(mut self, user_id: &str) -> Self {
        self.failing.insert(user_id.to_string());
        self
    }
}

#[async_trait]
impl FriendCountPolicy for FakePolicy {
    async fn is_confined(&self, user_id: &str) -> Result<bool> {
        if self.failing.contains(user_id) {
            return Err(Error::with_details(ErrorKind::RedisError, "cache error"));
        }
        Ok(self.confined.contains(user_id))
    }
}

#[derive(Debug, Default)]
pub struct FakeUser {
    users: HashMap<String, UserInfo>,
}

impl FakeUser {
    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.users.insert(user.stu_id.clone(), user);
        self
    }
}

#[async_trait]
impl UserRepo for FakeUser {
    async fn get_user_by_id(&self, stu_id: &str) -> Result<Option<UserInfo>> {
        Ok(self.users.get(stu_id).cloned())
    }
}
