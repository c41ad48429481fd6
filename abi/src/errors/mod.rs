use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use tracing::error;

/// postgres error code for unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnknownError,
    DbError,
    ConfigReadError,
    ConfigParseError,
    NotFound,
    Conflict,
    InternalServer,
    BodyParsing,
    PathParsing,
    BadRequest,
    RedisError,
    IOError,

    // invitation binding
    InvalidInvitationCode,
    CacheLookupFailed,
    SelfBindingNotAllowed,
    RelationLookupFailed,
    RelationAlreadyExists,
    ConfinementCheckFailed { user_id: String },
    FriendListFull { user_id: String },
    RelationCreateFailed,
}

#[derive(Debug, Serialize)]
pub struct Error {
    kind: ErrorKind,
    details: Option<String>,
    #[serde(skip)]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    #[inline]
    pub fn new(
        kind: ErrorKind,
        details: impl Into<String>,
        source: impl StdError + 'static + Send + Sync,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            details: Some(details.into()),
        }
    }

    #[inline]
    pub fn with_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            source: None,
            details: None,
        }
    }

    #[inline]
    pub fn with_details(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            source: None,
            details: Some(details.into()),
        }
    }

    /// wrap a collaborator error under a new kind, the original error stays reachable as source
    #[inline]
    pub fn wrap(kind: ErrorKind, details: impl Into<String>, source: Error) -> Self {
        Self {
            kind,
            details: Some(details.into()),
            source: Some(Box::new(source)),
        }
    }

    #[inline]
    pub fn internal(error: impl StdError + 'static + Send + Sync) -> Self {
        Self {
            kind: ErrorKind::InternalServer,
            details: Some(error.to_string()),
            source: Some(Box::new(error)),
        }
    }

    #[inline]
    pub fn internal_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::InternalServer, details)
    }

    #[inline]
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BadRequest, details)
    }

    #[inline]
    pub fn not_found() -> Self {
        Self::with_kind(ErrorKind::NotFound)
    }

    #[inline]
    pub fn not_found_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::NotFound, details)
    }

    #[inline]
    pub fn conflict(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Conflict, details)
    }

    #[inline]
    pub fn body_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BodyParsing, details)
    }

    #[inline]
    pub fn path_parsing(err: impl StdError + 'static + Send + Sync) -> Self {
        Self::new(ErrorKind::PathParsing, err.to_string(), err)
    }

    #[inline]
    pub fn invalid_invitation_code(code: &str) -> Self {
        Self::with_details(
            ErrorKind::InvalidInvitationCode,
            format!("invitation code {code} is invalid"),
        )
    }

    #[inline]
    pub fn self_binding() -> Self {
        Self::with_details(
            ErrorKind::SelfBindingNotAllowed,
            "cannot add yourself as friend",
        )
    }

    #[inline]
    pub fn relation_exists(user_id: &str, friend_id: &str) -> Self {
        Self::with_details(
            ErrorKind::RelationAlreadyExists,
            format!("relation between {user_id} and {friend_id} already exists"),
        )
    }

    #[inline]
    pub fn friend_list_full(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let details = format!("{user_id} friend list is full");
        Self::with_details(ErrorKind::FriendListFull { user_id }, details)
    }

    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[inline]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{:?}: {}", self.kind, details),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self.kind {
            ErrorKind::BodyParsing
            | ErrorKind::PathParsing
            | ErrorKind::BadRequest
            | ErrorKind::InvalidInvitationCode
            | ErrorKind::SelfBindingNotAllowed => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::RelationAlreadyExists => StatusCode::CONFLICT,
            ErrorKind::FriendListFull { .. } => StatusCode::FORBIDDEN,
            ErrorKind::UnknownError
            | ErrorKind::DbError
            | ErrorKind::ConfigReadError
            | ErrorKind::ConfigParseError
            | ErrorKind::InternalServer
            | ErrorKind::RedisError
            | ErrorKind::IOError
            | ErrorKind::CacheLookupFailed
            | ErrorKind::RelationLookupFailed
            | ErrorKind::ConfinementCheckFailed { .. }
            | ErrorKind::RelationCreateFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("custom error to http error: {:?}", self);
        (status_code, Json(self)).into_response()
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value.to_string(), value)
    }
}

impl From<redis::RedisError> for Error {
    fn from(value: redis::RedisError) -> Self {
        Self::new(ErrorKind::RedisError, value.to_string(), value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::new(ErrorKind::ConfigParseError, value.to_string(), value)
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        let kind = match &value {
            sqlx::Error::RowNotFound => ErrorKind::NotFound,
            sqlx::Error::Database(e) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                ErrorKind::Conflict
            }
            _ => ErrorKind::DbError,
        };
        Self::new(kind, value.to_string(), value)
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::new(ErrorKind::DbError, value.to_string(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_error_should_keep_source() {
        let cause = Error::with_details(ErrorKind::RedisError, "connection refused");
        let err = Error::wrap(ErrorKind::CacheLookupFailed, "resolve inviter", cause);
        assert_eq!(err.kind(), &ErrorKind::CacheLookupFailed);
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "RedisError: connection refused");
    }

    #[test]
    fn friend_list_full_should_carry_user_id() {
        let err = Error::friend_list_full("102300218");
        assert_eq!(
            err.kind(),
            &ErrorKind::FriendListFull {
                user_id: "102300218".to_string()
            }
        );
        assert_eq!(err.details(), Some("102300218 friend list is full"));
    }

    #[test]
    fn into_response_should_map_status() {
        let resp = Error::relation_exists("1", "2").into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let resp = Error::friend_list_full("1").into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let resp = Error::invalid_invitation_code("ABCDEF").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn serialized_error_should_skip_source() {
        let cause = Error::with_details(ErrorKind::DbError, "timeout");
        let err = Error::wrap(ErrorKind::RelationCreateFailed, "create relation", cause);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "kind": "RelationCreateFailed", "details": "create relation" })
        );
    }

    #[test]
    fn io_error_should_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "no file").into();
        assert_eq!(err.kind(), &ErrorKind::IOError);
    }
}
