use abi::errors::Error;
use axum::{
    async_trait,
    extract::{rejection::QueryRejection, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;

pub struct QueryExtractor<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryExtractor<T>
where
    axum::extract::Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err((
                rejection.status(),
                Error::bad_request(rejection.body_text()),
            )),
        }
    }
}
