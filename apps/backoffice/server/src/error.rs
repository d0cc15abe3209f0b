//! Custom error types for the back office
//!
//! One error type is shared by the repositories, the auth layer and the HTTP
//! handlers. Handlers return it directly and axum renders it as JSON through
//! the `IntoResponse` impl below.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Field name to list of messages, in field order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggle whether 500 responses carry the underlying error text.
pub fn set_expose_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// Main error type for back office operations
#[derive(Error, Debug)]
pub enum BackofficeError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Entity not found errors
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Request validation failures, keyed by field
    #[error("Validation error: {message}")]
    Validation { message: String, errors: FieldErrors },

    /// Malformed or incomplete request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or expired bearer token
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Login with an unknown email or a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors with a message
    #[error("{0}")]
    General(String),
}

impl BackofficeError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a validation error for a single field
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![msg.clone()]);
        Self::Validation {
            message: msg,
            errors,
        }
    }

    /// Create a validation error from a collected error map
    pub fn validation_errors(errors: FieldErrors) -> Self {
        let message = errors
            .values()
            .flat_map(|msgs| msgs.first())
            .next()
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_string());
        Self::Validation { message, errors }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound { entity, .. } => format!("{entity} not found"),
            Self::Validation { .. } => "Validation failed".to_string(),
            Self::BadRequest(msg) | Self::Forbidden(msg) => msg.clone(),
            Self::Unauthenticated => "Unauthenticated.".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        if self.status().is_server_error() && expose_details() {
            Some(self.to_string())
        } else {
            None
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
    }
}

impl IntoResponse for BackofficeError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = match &self {
            Self::Unauthenticated => json!({ "message": self.public_message() }),
            Self::Validation { errors, .. } => json!({
                "success": false,
                "message": self.public_message(),
                "errors": errors,
            }),
            _ => match self.detail() {
                Some(detail) => json!({
                    "success": false,
                    "message": self.public_message(),
                    "error": detail,
                }),
                None => json!({ "success": false, "message": self.public_message() }),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Error rendered with the `status` envelope used by the older
/// `/terms`, `/invoice-packages` and itinerary endpoints.
#[derive(Debug)]
pub struct LegacyError(pub BackofficeError);

impl From<BackofficeError> for LegacyError {
    fn from(err: BackofficeError) -> Self {
        Self(err)
    }
}

impl From<rusqlite::Error> for LegacyError {
    fn from(err: rusqlite::Error) -> Self {
        Self(BackofficeError::Database(err))
    }
}

impl IntoResponse for LegacyError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();
        let status = err.status();
        let label = match status {
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "Null",
            StatusCode::UNAUTHORIZED => {
                return (status, Json(json!({ "message": err.public_message() }))).into_response()
            }
            _ => "error",
        };
        let message = match &err {
            BackofficeError::Validation { message, .. } => message.clone(),
            other => other.public_message(),
        };
        let mut body = json!({ "status": label, "message": message });
        if let Some(detail) = err.detail() {
            body["error"] = json!(detail);
        }
        (status, Json(body)).into_response()
    }
}

/// Convert String errors to BackofficeError
impl From<String> for BackofficeError {
    fn from(s: String) -> Self {
        Self::General(s)
    }
}

/// Convert &str errors to BackofficeError
impl From<&str> for BackofficeError {
    fn from(s: &str) -> Self {
        Self::General(s.to_string())
    }
}

/// Result type alias using BackofficeError
pub type Result<T> = std::result::Result<T, BackofficeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = BackofficeError::not_found("Tour", 42);
        assert_eq!(err.to_string(), "Tour not found: 42");
        assert_eq!(err.public_message(), "Tour not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_error() {
        let err = BackofficeError::validation("title", "The title field is required.");
        assert_eq!(
            err.to_string(),
            "Validation error: The title field is required."
        );
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validation_errors_uses_first_message() {
        let mut errors = FieldErrors::new();
        errors.insert("email".into(), vec!["The email field is required.".into()]);
        errors.insert("name".into(), vec!["The name field is required.".into()]);
        let err = BackofficeError::validation_errors(errors);
        assert_eq!(err.to_string(), "Validation error: The email field is required.");
    }

    #[test]
    fn test_string_to_error_conversion() {
        let err: BackofficeError = "Something went wrong".into();
        assert_eq!(err.to_string(), "Something went wrong");
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(BackofficeError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            BackofficeError::forbidden("nope").status(),
            StatusCode::FORBIDDEN
        );
    }
}
