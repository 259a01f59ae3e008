//! Unified error handling for the API.
//!
//! Two wire shapes, matching the dashboard's expectations:
//!
//! - `{"error": "..."}` for everything except validation
//! - `{"errors": [{"field": "...", "message": "..."}]}` for field-level
//!   validation failures
//!
//! Store and identity failures on the primary request path are surfaced as
//! generic server errors; details go to logs and Sentry, never to the
//! caller. Aggregation side-effect failures never reach this type at all -
//! they are swallowed inside the aggregate updater.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Record store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity service operation failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failures.
    #[error("validation failed ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// Operation refused because other records still reference the target.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Store(_) | Self::Identity(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = match &self {
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) | Self::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
        };

        let body = match &self {
            Self::Validation(errors) => json!({ "errors": errors }),
            // Don't expose internal error details to clients
            Self::Store(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Identity(_) => json!({ "error": "Identity service error" }),
            Self::NotFound(entity) => json!({ "error": format!("{entity} not found") }),
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::BadRequest(message)
            | Self::Conflict(message) => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::NotFound("Client")), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Unauthorized("Access token required".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("Insufficient permissions".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("Invalid status".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("has deliveries".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Validation(vec![FieldError::new(
                "clientId",
                "Client ID is required"
            )])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = AppError::NotFound("Delivery");
        assert_eq!(err.to_string(), "Delivery not found");
    }

    #[test]
    fn test_store_error_converts() {
        let err: AppError = StoreError::NotFound.into();
        assert!(matches!(err, AppError::Store(StoreError::NotFound)));
    }
}
