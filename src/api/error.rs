//! API error types with structured JSON responses.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::dashboard::DashboardError;
use crate::db::DatabaseError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingParameter(&'static str),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Ambiguous result: {0}")]
    AmbiguousResult(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::MissingParameter(param) => (
                StatusCode::BAD_REQUEST,
                "MISSING_PARAMETER",
                format!("{param} is required"),
            ),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::InvalidIdentifier(detail) => (
                StatusCode::BAD_REQUEST,
                "INVALID_IDENTIFIER",
                detail.clone(),
            ),
            ApiError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                detail.clone(),
            ),
            ApiError::AmbiguousResult(detail) => {
                tracing::error!(detail, "Dashboard query returned more than one subject");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AMBIGUOUS_RESULT",
                    "The dashboard query returned inconsistent data".to_string(),
                )
            }
            ApiError::Query(detail) => {
                tracing::error!(detail, "Dashboard query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "QUERY_ERROR",
                    "The dashboard could not be loaded".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::InvalidIdentifier { .. } => ApiError::InvalidIdentifier(err.to_string()),
            DashboardError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DashboardError::AmbiguousResult { .. } => ApiError::AmbiguousResult(err.to_string()),
            DashboardError::Query(e) => ApiError::Query(e.to_string()),
        }
    }
}

/// Malformed query strings (e.g. a repeated parameter) get the JSON envelope too.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Query(err.to_string())
    }
}
