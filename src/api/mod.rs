//! Dashboard REST API.
//!
//! Exposes the three dashboards as read-only JSON endpoints under `/api/`.
//! The router is composable: `dashboard_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::dashboard_api_router;
pub use server::{start_dashboard_server, DashboardServer, ServerError, ServerSession};
pub use types::ApiContext;
