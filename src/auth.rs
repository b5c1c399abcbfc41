//! Resolves the requesting user from the `X-User-Id` header.
//!
//! Authentication happens upstream of this service; a trusted reverse proxy
//! injects the header after verifying the user's session. Requests without
//! the header are rejected with 401.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{Error, models::UserID};

/// The header the upstream proxy sets to the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// An extractor for the authenticated user's ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserID);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .ok_or(Error::Unauthorized)?;

        Ok(AuthenticatedUser(UserID::new(user_id)))
    }
}
