//! HTTP error types for the `docbin` server.
//!
//! Maps document store errors into HTTP responses. Every error produces a
//! JSON body with the machine-readable `error` code from
//! [`ErrorKind::code`] and a human-readable `message`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use docbin_core::error::{DocumentError, ErrorKind};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// A document store operation failed.
    Document(DocumentError),
    /// A request header or query value could not be parsed.
    BadRequest(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    /// The stable error kind this error reports to clients.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Document(err) => err.kind(),
            Self::BadRequest(_) => ErrorKind::InvalidInput,
        }
    }
}

/// HTTP status for an error kind.
#[must_use]
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::InvalidLength | ErrorKind::PasswordNeeded => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::InvalidPassword | ErrorKind::InvalidSecret => StatusCode::FORBIDDEN,
        ErrorKind::DocumentNotFound => StatusCode::NOT_FOUND,
        ErrorKind::NameAlreadyExists => StatusCode::CONFLICT,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = match self {
            Self::Document(err) if kind == ErrorKind::InternalError => {
                error!(error = %err, "document operation failed");
                "internal server error".to_owned()
            }
            Self::Document(err) => err.to_string(),
            Self::BadRequest(msg) => msg,
        };

        let body = ErrorBody {
            error: kind.code(),
            message,
        };

        (status_for(kind), axum::Json(body)).into_response()
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (ErrorKind::InvalidInput, StatusCode::BAD_REQUEST),
            (ErrorKind::InvalidLength, StatusCode::BAD_REQUEST),
            (ErrorKind::PasswordNeeded, StatusCode::BAD_REQUEST),
            (ErrorKind::InvalidPassword, StatusCode::FORBIDDEN),
            (ErrorKind::InvalidSecret, StatusCode::FORBIDDEN),
            (ErrorKind::DocumentNotFound, StatusCode::NOT_FOUND),
            (ErrorKind::NameAlreadyExists, StatusCode::CONFLICT),
            (ErrorKind::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, status) in cases {
            assert_eq!(status_for(kind), status, "{kind}");
        }
    }

    #[test]
    fn bad_request_is_invalid_input() {
        let response = AppError::BadRequest("lifetime must be a number".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
