//! Error Types for the Mirror API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes. The
//! WebSocket gateway embeds the same structure in its error envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mirror_core::{
    MirrorError, ObjectIdParseError, StorageError, ValidationError, Violation, ViolationKind,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// One or more field rules failed; `details` lists the violations
    ValidationFailed,

    /// Request body or message is not valid JSON of the expected shape
    InvalidInput,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// WebSocket event name is not handled by the gateway
    UnknownEvent,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Entity with the same identifier already exists
    EntityAlreadyExists,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::ValidationFailed | ErrorCode::InvalidInput | ErrorCode::InvalidFormat => {
                StatusCode::BAD_REQUEST
            }

            ErrorCode::EntityNotFound | ErrorCode::UnknownEvent => StatusCode::NOT_FOUND,

            ErrorCode::EntityAlreadyExists => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",

            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidFormat => "Invalid format",

            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::UnknownEvent => "Unknown event",

            ErrorCode::EntityAlreadyExists => "Entity already exists",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs.
/// It provides a consistent error format across REST and WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (violation lists and the like)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

/// One entry of a `ValidationFailed` error's `details` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ViolationReport {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl From<&Violation> for ViolationReport {
    fn from(violation: &Violation) -> Self {
        Self {
            field: violation.field.clone(),
            rule: violation.rule.clone(),
            message: violation.message.clone(),
        }
    }
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an Unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create an InvalidToken error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    /// Create a TokenExpired error.
    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    /// Create a ValidationFailed error carrying the violation list as
    /// `details = [{field, rule, message}]`.
    pub fn validation_failed(violations: &[Violation]) -> Self {
        let reports: Vec<ViolationReport> = violations.iter().map(ViolationReport::from).collect();
        let message = match violations {
            [single] => single.message.clone(),
            _ => format!("{} validation errors", violations.len()),
        };
        Self::new(ErrorCode::ValidationFailed, message)
            .with_details(serde_json::to_value(reports).unwrap_or_default())
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    /// Create an EntityNotFound error.
    pub fn entity_not_found(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    /// Create an UnknownEvent error.
    pub fn unknown_event(event: &str) -> Self {
        Self::new(
            ErrorCode::UnknownEvent,
            format!("Unknown event '{}'", event),
        )
    }

    /// Create an EntityAlreadyExists error.
    pub fn entity_already_exists(entity_type: &str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityAlreadyExists,
            format!("{} with id {} already exists", entity_type, id),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
///
/// This allows ApiError to be returned directly from Axum handlers:
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::unauthorized("Invalid credentials"))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<Vec<Violation>> for ApiError {
    fn from(violations: Vec<Violation>) -> Self {
        ApiError::validation_failed(&violations)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => {
                ApiError::entity_not_found(&entity.to_string(), id)
            }
            StorageError::AlreadyExists { entity, id } => {
                ApiError::entity_already_exists(&entity.to_string(), id)
            }
            StorageError::UnsupportedSearchField { field } => {
                let allowed = mirror_storage::SearchField::ALL
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                ApiError::validation_failed(&[Violation::new(
                    "field",
                    "isEnum",
                    ViolationKind::InvalidEnumValue,
                    format!(
                        "field must be one of the following values: {} (got '{}')",
                        allowed, field
                    ),
                )])
            }
        }
    }
}

impl From<MirrorError> for ApiError {
    fn from(err: MirrorError) -> Self {
        match err {
            MirrorError::Storage(err) => err.into(),
            MirrorError::Validation(ValidationError::Rejected { violations }) => {
                ApiError::validation_failed(&violations)
            }
            MirrorError::Config(err) => {
                tracing::error!(error = %err, "Configuration error surfaced in a request");
                ApiError::internal_error("Server misconfigured")
            }
        }
    }
}

impl From<ObjectIdParseError> for ApiError {
    fn from(err: ObjectIdParseError) -> Self {
        ApiError::invalid_format("id", &format!("24-character hex identifier ({})", err))
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(error = %err, "Rejected malformed JSON");
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
///
/// This is the standard result type used throughout the API layer.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_core::EntityKind;

    fn violation(field: &str, kind: ViolationKind) -> Violation {
        Violation::new(field, "rule", kind, format!("{} is wrong", field))
    }

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::EntityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::UnknownEvent.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::EntityAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_failed_details() {
        let err = ApiError::validation_failed(&[
            violation("tags", ViolationKind::ArrayTooLarge),
            violation("tagType", ViolationKind::InvalidEnumValue),
        ]);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "2 validation errors");

        let details = err.details.expect("details");
        assert_eq!(details[0]["field"], "tags");
        assert_eq!(details[0]["rule"], "rule");
        assert_eq!(details[1]["message"], "tagType is wrong");
        assert!(details[0].get("kind").is_none());
    }

    #[test]
    fn test_single_violation_becomes_message() {
        let err = ApiError::from(vec![violation("tags", ViolationKind::DuplicateElement)]);
        assert_eq!(err.message, "tags is wrong");
    }

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let err = ApiError::from(StorageError::NotFound {
            entity: EntityKind::Environment,
            id: "abc".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.message.contains("Environment"));
    }

    #[test]
    fn test_unsupported_search_field_is_violation() {
        let err = ApiError::from(StorageError::UnsupportedSearchField {
            field: "owner".to_string(),
        });
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.expect("details");
        assert_eq!(details[0]["field"], "field");
        assert_eq!(details[0]["rule"], "isEnum");
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::unauthorized("Invalid token");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("UNAUTHORIZED"));
        assert!(json.contains("Invalid token"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::internal_error("boom");
        let display = format!("{}", err);

        assert!(display.contains("InternalError"));
        assert!(display.contains("boom"));
    }
}
