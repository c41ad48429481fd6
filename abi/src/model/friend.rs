use serde::{Deserialize, Serialize};

/// directed relation created by a successful invitation binding,
/// follower is the user who redeemed the code, followed is the code issuer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRelation {
    pub id: i64,
    pub follower_id: String,
    pub followed_id: String,
    pub status: i16,
    pub create_time: i64,
}

impl FriendRelation {
    pub fn new(follower_id: impl Into<String>, followed_id: impl Into<String>) -> Self {
        Self {
            follower_id: follower_id.into(),
            followed_id: followed_id.into(),
            create_time: chrono::Utc::now().timestamp_millis(),
            ..Default::default()
        }
    }
}
