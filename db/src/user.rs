use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::UserInfo;

#[async_trait]
pub trait UserRepo: Sync + Send + Debug {
    /// get user profile by student id
    async fn get_user_by_id(&self, stu_id: &str) -> Result<Option<UserInfo>>;
}
