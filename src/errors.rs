use crate::services::{answer_matcher::QaError, media_repository::MediaError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for handler errors that keeps the message local.
///
/// Rendered as `{"status": "error", "message": ...}` with `status` as the
/// HTTP code.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "message": self.message,
        }));

        (self.status, body).into_response()
    }
}

impl From<QaError> for AppError {
    fn from(err: QaError) -> Self {
        match err {
            QaError::EmptyField => AppError::bad_request(err.to_string()),
            QaError::NotFound(_) => AppError::not_found(err.to_string()),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::MissingFile(_)
            | MediaError::EmptyFilename
            | MediaError::UnsupportedType(_)
            | MediaError::InvalidFilename => AppError::bad_request(err.to_string()),
            MediaError::NotFound { .. } => AppError::not_found(err.to_string()),
            MediaError::Io(io_err) => {
                tracing::error!("media storage failure: {}", io_err);
                AppError::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::MediaKind;
    use std::io;

    #[test]
    fn component_errors_map_to_status_codes() {
        assert_eq!(AppError::from(QaError::EmptyField).status, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(QaError::NotFound("x".into())).status,
            StatusCode::NOT_FOUND
        );
        let unsupported = AppError::from(MediaError::UnsupportedType(MediaKind::Image));
        assert_eq!(unsupported.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            unsupported.message,
            "Invalid file type. Only jpg, jpeg, png, and gif are allowed."
        );
        assert_eq!(
            AppError::from(MediaError::MissingFile(MediaKind::Video)).message,
            "No video file provided"
        );
    }

    #[test]
    fn io_failures_do_not_leak_detail() {
        let err = AppError::from(MediaError::Io(io::Error::other("disk on fire at /srv")));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
