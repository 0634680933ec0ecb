//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use curdmate_core::chat::SessionError;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A turn the session refused to run.
    Session(SessionError),
    /// No live session with this id.
    SessionNotFound(String),
    /// Malformed request.
    Validation(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Session(SessionError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", SessionError::EmptyMessage.to_string())
            }
            AppError::Session(SessionError::Expired) => {
                (StatusCode::UNAUTHORIZED, "SESSION_EXPIRED", SessionError::Expired.to_string())
            }
            AppError::SessionNotFound(id) => {
                (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", format!("Session '{id}' not found"))
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(%code, %message, "request failed");
        } else {
            tracing::debug!(%code, %message, "request rejected");
        }
        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string(), 0);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_map_to_status() {
        assert_eq!(AppError::from(SessionError::EmptyMessage).parts().0, StatusCode::BAD_REQUEST);
        let (status, code, _) = AppError::from(SessionError::Expired).parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "SESSION_EXPIRED");
    }

    #[test]
    fn test_not_found_names_the_session() {
        let (status, code, message) = AppError::SessionNotFound("abc".into()).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "SESSION_NOT_FOUND");
        assert!(message.contains("abc"));
    }

    #[test]
    fn test_into_response_status() {
        let resp = AppError::Validation("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = AppError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
