use serde::{Deserialize, Serialize};

/// prefix of the cache key mapping an invitation code to its issuer
pub const CODE_MAPPING_PREFIX: &str = "code_mapping";

/// build the namespaced cache key of an invitation code
pub fn code_mapping_key(code: &str) -> String {
    format!("{}:{}", CODE_MAPPING_PREFIX, code)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationCode {
    pub code: String,
    /// unix timestamp in seconds
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindInvitationRequest {
    pub stu_id: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvitationCodeQuery {
    #[serde(default)]
    pub is_refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_mapping_key_should_be_namespaced() {
        assert_eq!(code_mapping_key("ABCDEF"), "code_mapping:ABCDEF");
    }
}
