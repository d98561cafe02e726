//! Dashboard API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost): CORS → access log → handler.

use axum::http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the dashboard API router.
///
/// Browsers may call the API from any origin; the dashboards are
/// read-only and carry no cookies.
pub fn dashboard_api_router(ctx: ApiContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([ORIGIN, CONTENT_LENGTH, CONTENT_TYPE, AUTHORIZATION]);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/dashboard/patient", get(endpoints::dashboard::patient))
        .route("/dashboard/doctor", get(endpoints::dashboard::doctor))
        .route("/dashboard/nurse", get(endpoints::dashboard::nurse))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(cors);

    Router::new().nest("/api", api)
}
