use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Default, Deserialize, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub stu_id: String,
    pub name: String,
    pub sex: String,
    pub birthday: String,
    pub college: String,
    pub grade: String,
    pub major: String,
}
