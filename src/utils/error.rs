//! Error Handling Utilities
//!
//! Central error taxonomy for the service, plus the per-field error map used
//! by the registration pipeline to report every violation in one pass.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::store::StoreError;

/// Ordered map of field name to the messages reported against that field.
///
/// Validation never fails fast: every rule contributes its violation here and
/// the whole map is surfaced to the caller at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Absorbs every entry of `other`.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any message was recorded against `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded against `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Convenience constructor for a single-field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut map = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for field '{}'", field));
                map.insert(field, message);
            }
        }
        map
    }
}

/// Main application error type spanning every feature.
#[derive(Error, Debug)]
pub enum AppError {
    /// Per-field validation failures, surfaced verbatim to the caller
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Generic authentication failure; deliberately silent about which part
    /// was wrong or whether the account exists
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Account temporarily locked; callers render the remaining countdown
    #[error("Account locked for {remaining_seconds} more seconds")]
    LockedOut { remaining_seconds: u64 },

    /// Operation attempted without the capability that permits it
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Resource not found (only the recovery-identifier step surfaces this)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Backing-store failure; logged internally, opaque to the caller
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Generic internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Standard error response structure for API endpoints
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(error: &str, message: &str, details: serde_json::Value) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: Some(details),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let response = match self {
            AppError::Validation(fields) => {
                let details = serde_json::to_value(&fields).unwrap_or_default();
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::with_details(
                        "VALIDATION_ERROR",
                        "One or more fields are invalid",
                        details,
                    )),
                )
            }
            AppError::Authentication(message) => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("AUTHENTICATION_ERROR", &message)),
            ),
            AppError::LockedOut { remaining_seconds } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse::with_details(
                    "LOCKED_OUT",
                    "Too many failed attempts",
                    serde_json::json!({ "remaining_seconds": remaining_seconds }),
                )),
            ),
            AppError::Authorization(message) => (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new("AUTHORIZATION_ERROR", &message)),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("NOT_FOUND", &message)),
            ),
            AppError::Store(error) => {
                log::error!("store error: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "STORE_ERROR",
                        "A storage error occurred",
                    )),
                )
            }
            AppError::Hashing(error) => {
                log::error!("hashing error: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "HASHING_ERROR",
                        "Password hashing error",
                    )),
                )
            }
            AppError::Internal(message) => {
                log::error!("internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "INTERNAL_ERROR",
                        "An internal server error occurred",
                    )),
                )
            }
        };
        response.into_response()
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.insert("password", "too short");
        errors.insert("password", "missing digit");
        errors.insert("email", "invalid");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("password"),
            Some(&["too short".to_string(), "missing digit".to_string()][..])
        );
    }

    #[test]
    fn test_field_errors_merge() {
        let mut left = FieldErrors::single("username", "taken");
        let right = FieldErrors::single("email", "taken");
        left.merge(right);

        assert!(left.contains("username"));
        assert!(left.contains("email"));
        assert_eq!(left.len(), 2);
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let errors = FieldErrors::single("id_number", "ID Number already exists.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["id_number"][0], "ID Number already exists.");
    }

    #[test]
    fn test_error_response_creation() {
        let error = ErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.error, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.details.is_none());
    }

    #[test]
    fn test_locked_out_display() {
        let error = AppError::LockedOut {
            remaining_seconds: 15,
        };
        assert_eq!(error.to_string(), "Account locked for 15 more seconds");
    }
}
