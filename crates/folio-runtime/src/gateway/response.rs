use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use folio_core::error::FolioError;

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error returned from a handler.
///
/// The message is what the client sees; internal details are logged
/// where the error is created and never sent.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a core error raised by `operation`. `public_message` is used for
    /// server failures so filesystem details stay in the log.
    pub fn from_error(operation: &str, err: FolioError, public_message: &str) -> Self {
        match err {
            FolioError::NotFound(what) => {
                tracing::info!("{}: not found: {}", operation, what);
                Self::not_found(public_message)
            }
            FolioError::InvalidInput(reason) => {
                tracing::warn!("{}: rejected: {}", operation, reason);
                Self::bad_request(reason)
            }
            other => {
                tracing::error!("{}: {}", operation, other);
                Self::internal(public_message)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::internal("").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_error() {
        let err = ApiError::from_error(
            "GET /api/reports/{appName}",
            FolioError::NotFound("report 'x'".into()),
            "Report not found",
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Report not found");

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/secret/path");
        let err = ApiError::from_error("GET /api/reports", io.into(), "Failed to fetch reports");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("/secret/path"));
    }

    #[test]
    fn test_error_body_serialization() {
        let json = serde_json::to_string(&ErrorBody {
            error: "Report not found".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"Report not found"}"#);
    }
}
