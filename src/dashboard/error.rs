use thiserror::Error;

use crate::db::DatabaseError;

use super::source::SubjectKind;

/// Failure of a dashboard call. Every variant carries a stable
/// machine-readable code (see [`DashboardError::code`]).
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{field} must be a positive integer, got {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("Dashboard query failed: {0}")]
    Query(#[from] DatabaseError),

    #[error("No dashboard found for {subject} {id}")]
    NotFound { subject: SubjectKind, id: i64 },

    #[error("Dashboard query for {subject} {id} returned {} distinct patients: {subject_ids:?}", .subject_ids.len())]
    AmbiguousResult {
        subject: SubjectKind,
        id: i64,
        subject_ids: Vec<i64>,
    },
}

impl DashboardError {
    pub fn code(&self) -> &'static str {
        match self {
            DashboardError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            DashboardError::Query(_) => "QUERY_ERROR",
            DashboardError::NotFound { .. } => "NOT_FOUND",
            DashboardError::AmbiguousResult { .. } => "AMBIGUOUS_RESULT",
        }
    }
}
