use thiserror::Error;

/// Errors from the record API (used by the trait definition in curdmate-core).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordApiError {
    #[error("record not found")]
    NotFound,

    /// Credential rejected (HTTP 401). Ends the chat session.
    #[error("unauthorized")]
    Unauthorized,

    /// Duplicate record (HTTP 409).
    #[error("{0}")]
    Conflict(String),

    /// Payload rejected by the backend (HTTP 400/422).
    #[error("{0}")]
    Rejected(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16, message: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Deserialization(String),
}

impl RecordApiError {
    /// The message shown to the user for a failed operation.
    ///
    /// Prefers the backend's own error text when it supplied one.
    pub fn user_message(&self) -> String {
        match self {
            RecordApiError::Status {
                message: Some(m), ..
            } => m.clone(),
            other => other.to_string(),
        }
    }
}

/// A field value that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = RecordApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert_eq!(err.user_message(), "HTTP error! status: 500");
    }

    #[test]
    fn test_status_error_prefers_backend_message() {
        let err = RecordApiError::Status {
            status: 503,
            message: Some("database offline".to_string()),
        };
        assert_eq!(err.user_message(), "database offline");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("email", "please enter a valid email address");
        assert_eq!(
            err.to_string(),
            "invalid email: please enter a valid email address"
        );
    }
}
