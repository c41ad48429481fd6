use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users::{
    bind_invitation, get_friend_list, get_invitation_code, get_user_info,
};
use crate::AppState;

pub(crate) fn app_routes(state: AppState) -> Router {
    Router::new().nest("/user", user_routes(state))
}

fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/invitation/bind", post(bind_invitation))
        .route("/invitation/:stu_id", get(get_invitation_code))
        .route("/:stu_id/friends", get(get_friend_list))
        .route("/:stu_id", get(get_user_info))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use abi::model::UserInfo;
    use user::test_util::{FakeCache, FakePolicy, FakeRelation, FakeUser};
    use user::UserService;

    use super::*;

    fn app(cache: FakeCache, relation: FakeRelation, policy: FakePolicy) -> Router {
        let user = FakeUser::default().with_user(UserInfo {
            stu_id: "102300217".to_string(),
            name: "alice".to_string(),
            ..Default::default()
        });
        let service = UserService::new(
            Arc::new(cache),
            Arc::new(relation),
            Arc::new(user),
            Arc::new(policy),
            6,
        );
        app_routes(AppState { user: service })
    }

    fn bind_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/user/invitation/bind")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bind_should_return_ok() {
        let cache = FakeCache::default().with_mapping("ABCDEF", "102300218");
        let app = app(cache, FakeRelation::default(), FakePolicy::default());

        let resp = app
            .oneshot(bind_request(r#"{"stu_id":"102300217","code":"ABCDEF"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bind_unknown_code_should_be_bad_request() {
        let app = app(
            FakeCache::default(),
            FakeRelation::default(),
            FakePolicy::default(),
        );

        let resp = app
            .oneshot(bind_request(r#"{"stu_id":"102300217","code":"ZZZZZZ"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["kind"], "InvalidInvitationCode");
    }

    #[tokio::test]
    async fn bind_existing_relation_should_conflict() {
        let cache = FakeCache::default().with_mapping("ABCDEF", "102300218");
        let relation = FakeRelation::default().with_relation("102300217", "102300218");
        let app = app(cache, relation, FakePolicy::default());

        let resp = app
            .oneshot(bind_request(r#"{"stu_id":"102300217","code":"ABCDEF"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn bind_full_friend_list_should_name_the_user() {
        let cache = FakeCache::default().with_mapping("ABCDEF", "102300218");
        let policy = FakePolicy::default().confined("102300218");
        let app = app(cache, FakeRelation::default(), policy);

        let resp = app
            .oneshot(bind_request(r#"{"stu_id":"102300217","code":"ABCDEF"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = body_json(resp).await;
        assert_eq!(body["kind"]["FriendListFull"]["user_id"], "102300218");
    }

    #[tokio::test]
    async fn bind_malformed_body_should_be_rejected() {
        let app = app(
            FakeCache::default(),
            FakeRelation::default(),
            FakePolicy::default(),
        );

        let resp = app
            .oneshot(bind_request(r#"{"stu_id":"102300217"}"#))
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
        let body = body_json(resp).await;
        assert_eq!(body["kind"], "BodyParsing");
    }

    #[tokio::test]
    async fn get_invitation_code_should_reuse_live_code() {
        let cache = FakeCache::default()
            .with_code("102300217", "ABCDEF", 1700000000)
            .with_mapping("ABCDEF", "102300217");
        let app = app(cache, FakeRelation::default(), FakePolicy::default());

        let resp = app
            .oneshot(get_request("/user/invitation/102300217?is_refresh=false"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["code"], "ABCDEF");
        assert_eq!(body["created_at"], 1700000000);
    }

    #[tokio::test]
    async fn get_invitation_code_without_query_should_issue_code() {
        let app = app(
            FakeCache::default(),
            FakeRelation::default(),
            FakePolicy::default(),
        );

        let resp = app
            .oneshot(get_request("/user/invitation/102300217"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["code"].as_str().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn bad_refresh_flag_should_be_bad_request() {
        let app = app(
            FakeCache::default(),
            FakeRelation::default(),
            FakePolicy::default(),
        );

        let resp = app
            .oneshot(get_request("/user/invitation/102300217?is_refresh=maybe"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_friend_list_should_work() {
        let relation = FakeRelation::default().with_relation("102300217", "102300218");
        let app = app(FakeCache::default(), relation, FakePolicy::default());

        let resp = app
            .oneshot(get_request("/user/102300217/friends"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body, serde_json::json!(["102300218"]));
    }

    #[tokio::test]
    async fn get_user_info_should_work() {
        let app = app(
            FakeCache::default(),
            FakeRelation::default(),
            FakePolicy::default(),
        );

        let resp = app
            .clone()
            .oneshot(get_request("/user/102300217"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["name"], "alice");

        let resp = app.oneshot(get_request("/user/102300299")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
