use nanoid::nanoid;
use tracing::debug;

use abi::errors::{Error, ErrorKind};
use abi::model::{code_mapping_key, InvitationCode};

use super::UserService;

/// invitation codes are typed in by hand, keep them to uppercase letters and digits
const CODE_ALPHABET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

const MAX_GENERATE_ATTEMPTS: usize = 5;

impl UserService {
    /// return the user's live invitation code, or issue a new one when
    /// there is none, it has been redeemed, or `is_refresh` is set
    pub async fn get_invitation_code(
        &self,
        stu_id: &str,
        is_refresh: bool,
    ) -> Result<InvitationCode, Error> {
        let current = self.cache.get_invitation_code(stu_id).await?;
        if let Some(code) = current {
            // a consumed code may have been issued again to someone else
            if self.owns_code(stu_id, &code.code).await? {
                if !is_refresh {
                    return Ok(code);
                }
                // the old code must stop resolving to this user
                self.cache
                    .delete_mapping(&code_mapping_key(&code.code))
                    .await?;
            }
        }

        let code = InvitationCode {
            code: self.unused_code().await?,
            created_at: chrono::Utc::now().timestamp(),
        };
        self.cache.save_invitation_code(stu_id, &code).await?;
        debug!("issue invitation code {} for {}", code.code, stu_id);
        Ok(code)
    }

    async fn owns_code(&self, stu_id: &str, code: &str) -> Result<bool, Error> {
        let key = code_mapping_key(code);
        if !self.cache.exists(&key).await {
            return Ok(false);
        }
        match self.cache.resolve_inviter_id(&key).await {
            Ok(owner) => Ok(owner == stu_id),
            // expired after the existence check
            Err(e) if e.kind() == &ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn unused_code(&self) -> Result<String, Error> {
        let len = self.code_len;
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let code = nanoid!(len, &CODE_ALPHABET);
            if !self.cache.exists(&code_mapping_key(&code)).await {
                return Ok(code);
            }
        }
        Err(Error::internal_with_details(
            "failed to generate an unused invitation code",
        ))
    }
}
