//! Shared types for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::dashboard::{DashboardError, DashboardService, SqliteRowSource};
use crate::db;

/// Shared context for all API routes.
///
/// Holds only the database location: every request opens its own
/// read-only connection and aggregation state.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: Arc<PathBuf>,
}

impl ApiContext {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    /// Run a dashboard operation on the blocking pool.
    ///
    /// SQLite access is synchronous, so the connection, row source and
    /// service all live inside `spawn_blocking` for the duration of `op`.
    pub async fn with_dashboards<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&DashboardService<SqliteRowSource<'_>>) -> Result<T, DashboardError>
            + Send
            + 'static,
        T: Send + 'static,
    {
        let path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let conn = db::open_read_only(&path)?;
            let service = DashboardService::new(SqliteRowSource::new(&conn));
            Ok(op(&service)?)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("dashboard task failed: {e}")))?
    }
}
