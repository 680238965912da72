use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::response::error_response;

/// Why a request did not pass the trust boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing or invalid authorization header")]
    MissingAuthorization,
    #[error("Invalid origin")]
    InvalidOrigin { origin: String },
    #[error("Invalid or expired token")]
    InvalidToken,
}

impl AuthError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "missing_authorization",
            AuthError::InvalidOrigin { .. } => "invalid_origin",
            AuthError::InvalidToken => "invalid_token",
        }
    }

    /// The 401 sent to the caller. With `disclose` off every rejection
    /// carries the same message.
    pub fn to_response(&self, disclose: bool) -> Response {
        if disclose {
            error_response(StatusCode::UNAUTHORIZED, self.to_string())
        } else {
            error_response(StatusCode::UNAUTHORIZED, "Unauthorized request")
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.to_response(true)
    }
}
