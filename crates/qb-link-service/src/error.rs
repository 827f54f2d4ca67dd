//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;

use qb_link_store::StoreError;

use crate::linker::LinkError;
use crate::quickbooks::QuickBooksError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No QuickBooks session - the user is sent back to the login page.
    #[error("QuickBooks session required")]
    SessionRequired,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - a customer with this display name already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// QuickBooks or Intuit failed.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::SessionRequired => {
                tracing::debug!("No QuickBooks session - redirecting to login");
                return Redirect::to("/").into_response();
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            Self::ExternalService(msg) => {
                tracing::warn!(error = %msg, "External service error");
                (StatusCode::BAD_GATEWAY, "external_service_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateDisplayName { display_name } => {
                Self::Conflict(format!("customer already exists: {display_name}"))
            }
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<QuickBooksError> for ApiError {
    fn from(err: QuickBooksError) -> Self {
        match err {
            QuickBooksError::Configuration(msg) => Self::Internal(msg),
            other => Self::ExternalService(other.to_string()),
        }
    }
}

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::NoSession => Self::SessionRequired,
            LinkError::Remote(e) => e.into(),
            LinkError::Store(e) => e.into(),
            LinkError::Invalid(e) => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<qb_link_core::Error> for ApiError {
    fn from(err: qb_link_core::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}
