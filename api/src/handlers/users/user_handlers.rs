use axum::extract::State;
use axum::Json;

use abi::errors::Error;
use abi::model::UserInfo;

use crate::api_utils::custom_extract::PathExtractor;
use crate::AppState;

pub async fn get_user_info(
    State(app_state): State<AppState>,
    PathExtractor(stu_id): PathExtractor<String>,
) -> Result<Json<UserInfo>, Error> {
    let user = app_state.user.get_user_info(&stu_id).await?;
    Ok(Json(user))
}

pub async fn get_friend_list(
    State(app_state): State<AppState>,
    PathExtractor(stu_id): PathExtractor<String>,
) -> Result<Json<Vec<String>>, Error> {
    let friends = app_state.user.get_friend_list(&stu_id).await?;
    Ok(Json(friends))
}
