pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod models;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError};
use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Server(#[from] api::ServerError),

    #[error("Cannot listen for shutdown signal: {0}")]
    Signal(std::io::Error),
}

/// Initialize tracing from `RUST_LOG`, falling back to the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load configuration, prepare the database and serve dashboards until Ctrl-C.
pub async fn run() -> Result<(), RunError> {
    let config = AppConfig::from_env()?;
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    serve(config, shutdown_signal()).await
}

/// Serve dashboards with `config` until `shutdown` resolves.
pub async fn serve<F>(config: AppConfig, shutdown: F) -> Result<(), RunError>
where
    F: std::future::Future<Output = Result<(), std::io::Error>>,
{
    // Apply migrations once; requests then open read-only connections.
    drop(db::open_database(&config.db_path)?);
    tracing::info!(db_path = %config.db_path.display(), "Database ready");

    let ctx = api::ApiContext::new(config.db_path.clone());
    let mut server = api::start_dashboard_server(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Serving dashboards");

    let signal = shutdown.await;
    server.shutdown();
    server.stopped().await;
    signal.map_err(RunError::Signal)
}

async fn shutdown_signal() -> Result<(), std::io::Error> {
    tokio::signal::ctrl_c().await
}
