//! Caller identity extractor.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Response;
use draftboard_core::model::UserId;

use crate::error::ErrorBody;

/// Header set by the authenticating gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .filter(|id| *id > 0);

        match user_id {
            Some(user_id) => Ok(Self(user_id)),
            None => Err(ErrorBody::respond(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                format!("missing or invalid {USER_ID_HEADER} header"),
            )),
        }
    }
}
