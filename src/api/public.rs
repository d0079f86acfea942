//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::responder::DraftError;

// Errors

pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, anyhow::anyhow!("{}", message))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}", self.error);
        } else {
            tracing::debug!("Rejected request: {}", self.error);
        }

        let message = if self.status.is_server_error() {
            format!("Something went wrong: {}", self.error)
        } else {
            self.error.to_string()
        };
        (self.status, message).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

/// Map draft desk errors onto client facing status codes.
pub fn draft_error(err: DraftError) -> ApiError {
    let status = match err {
        DraftError::UnknownEmail(_) => StatusCode::NOT_FOUND,
        DraftError::EmptyDraft => StatusCode::UNPROCESSABLE_ENTITY,
    };
    ApiError::new(status, err)
}

// Re-export public types from each route

pub mod analytics {
    pub use crate::api::routes::analytics::public::*;
}

pub mod drafts {
    pub use crate::api::routes::drafts::public::*;
}

pub mod emails {
    pub use crate::api::routes::emails::public::*;
}
