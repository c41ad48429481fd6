use abi::errors::Error;
use abi::model::UserInfo;

use super::UserService;

impl UserService {
    pub async fn get_user_info(&self, stu_id: &str) -> Result<UserInfo, Error> {
        self.user
            .get_user_by_id(stu_id)
            .await?
            .ok_or_else(|| Error::not_found_with_details(format!("user {stu_id}")))
    }

    /// friend ids of the user from the relation store
    pub async fn get_friend_list(&self, stu_id: &str) -> Result<Vec<String>, Error> {
        self.relation.friend_ids(stu_id).await
    }
}
