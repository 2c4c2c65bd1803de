// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::{FieldError, ValidationResult};
use crate::services::identity::IdentityError;
use crate::services::session::SessionError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
    Validation(Vec<FieldError>),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::Validation(errors) => {
                write!(f, "Validation Error: {} invalid field(s)", errors.len())
            }
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED", None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN", None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST", None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND", None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT", None),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
                None,
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                    None,
                )
            }
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR",
                Some(errors),
            ),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
            details,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        ApiError::Validation(result.errors)
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            // Unknown email and wrong password are deliberately not
            // distinguished, to avoid account enumeration.
            IdentityError::InvalidCredentials => {
                ApiError::Unauthorized("invalid email or password".to_string())
            }
            IdentityError::DuplicateAccount => {
                ApiError::Conflict("an account with this email already exists".to_string())
            }
            IdentityError::UserNotFound => ApiError::NotFound("user not found".to_string()),
            IdentityError::NotExternal => {
                ApiError::BadRequest("provider does not supply external identities".to_string())
            }
            IdentityError::Password(e) => {
                error!(error = %e, "Password hashing failed");
                ApiError::InternalServer("internal error".to_string())
            }
            IdentityError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Identity(e) => e.into(),
            SessionError::InvalidRefreshToken => {
                ApiError::Forbidden("invalid refresh token".to_string())
            }
            SessionError::RefreshTokenNotFound => {
                ApiError::Forbidden("refresh token expired or revoked".to_string())
            }
            SessionError::Token(e) => {
                error!(error = %e, "Token signing failed");
                ApiError::InternalServer("token error".to_string())
            }
            SessionError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}
