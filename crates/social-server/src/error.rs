//! HTTP error type shared by all handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use social_types::ErrorBody;
use thiserror::Error;
use tracing::{debug, error};

use crate::storage::{Constraint, StoreError};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed JSON, unknown or missing fields, or a field rule failed
    #[error("{0}")]
    Validation(String),

    /// A referenced user does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate username or follow edge
    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConstraintViolation {
                constraint: Constraint::Unique,
                message,
            } => ApiError::Conflict(message),
            StoreError::ConstraintViolation {
                constraint: Constraint::ForeignKey,
                message,
            } => ApiError::NotFound(message),
            StoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage internals stay in the log
        let detail = match &self {
            ApiError::Internal(message) => {
                error!("Request failed: {}", message);
                "Internal server error".to_string()
            }
            other => {
                debug!(status = status.as_u16(), "Request rejected: {}", other);
                other.to_string()
            }
        };

        let body = Json(ErrorBody {
            detail,
            code: self.code().to_string(),
        });
        (status, body).into_response()
    }
}
