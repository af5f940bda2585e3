//! Error Types
//!
//! One error enum for the whole service. Every variant is reported per
//! request through the JSON envelope; none of them stop the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::{catalog::models::BookId, envelope::Envelope};

/// Type alias for `Result<T, bookstore_cart::Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents all the ways a cart or catalog operation can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// A token or book id that was never issued/created.
    #[error("could not find {0}")]
    NotFound(&'static str),

    /// A merge referenced a book that is not in the catalog.
    #[error("could not find book {0} to add to the cart")]
    BookNotFound(BookId),

    /// Input that is well-formed JSON but violates a field rule.
    #[error("{0}")]
    Validation(String),

    /// Request body could not be decoded at all.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Backing store unreachable, failing, or timed out.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A freshly generated token already names a cart.
    #[error("token already issued")]
    TokenCollision,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) | Error::BookNotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Error::StoreUnavailable(_) | Error::TokenCollision => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::StoreUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::StoreUnavailable(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::StoreUnavailable("store call timed out".to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            debug!(%status, "{message}");
        }

        (status, Json(Envelope::failure(message))).into_response()
    }
}
