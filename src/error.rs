//! Defines the app level error type and its mapping onto HTTP responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
///
/// The first three variants are the domain error kinds every core operation
/// may raise. The remaining variants wrap infrastructure failures, which are
/// surfaced to the client as a generic server error without detail.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The caller supplied missing, malformed, or out-of-range input, e.g. a
    /// non-positive amount or a transfer without a destination account.
    #[error("{0}")]
    Validation(String),

    /// The requested entity does not exist, or is not owned by the caller.
    ///
    /// Both cases deliberately look the same from the outside so that
    /// ownership cannot be probed by iterating over IDs.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The operation would violate an invariant, e.g. deleting an account
    /// that still has transactions referencing it.
    #[error("{0}")]
    Conflict(String),

    /// The request did not carry a resolvable owner identity.
    ///
    /// Identity resolution happens upstream; this only means the upstream
    /// header was absent or unparseable.
    #[error("missing or invalid user identity")]
    Unauthorized,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            value => {
                tracing::error!("an unhandled SQL error occurred: {}", value);
                Error::SqlError(value)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, message) = match &self {
            Error::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Conflict(message) => (StatusCode::CONFLICT, message.clone()),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            // Infrastructure errors are not meant to be shown to the client.
            error => {
                tracing::error!("an unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something went wrong, try again later".to_owned(),
                )
            }
        };

        (status_code, Json(json!({ "message": message }))).into_response()
    }
}
