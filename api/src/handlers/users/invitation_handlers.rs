use axum::extract::State;
use axum::Json;
use tracing::debug;

use abi::errors::Error;
use abi::model::{BindInvitationRequest, InvitationCode, InvitationCodeQuery};

use crate::api_utils::custom_extract::{JsonExtractor, PathExtractor, QueryExtractor};
use crate::AppState;

/// bind the requester and the issuer of the invitation code as friends
pub async fn bind_invitation(
    State(app_state): State<AppState>,
    JsonExtractor(req): JsonExtractor<BindInvitationRequest>,
) -> Result<(), Error> {
    if req.stu_id.is_empty() || req.code.is_empty() {
        return Err(Error::bad_request("stu_id and code are required"));
    }
    debug!("bind invitation code {} for {}", req.code, req.stu_id);
    app_state.user.bind_invitation(&req.stu_id, &req.code).await
}

pub async fn get_invitation_code(
    State(app_state): State<AppState>,
    PathExtractor(stu_id): PathExtractor<String>,
    QueryExtractor(query): QueryExtractor<InvitationCodeQuery>,
) -> Result<Json<InvitationCode>, Error> {
    let code = app_state
        .user
        .get_invitation_code(&stu_id, query.is_refresh)
        .await?;
    Ok(Json(code))
}
