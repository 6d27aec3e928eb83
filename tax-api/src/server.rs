use std::sync::Arc;

use anyhow::{Context, Result};
use tax_core::{DbConfig, RepositoryRegistry, TaxRepository, TaxService};
use tax_db_sqlite::SqliteRepositoryFactory;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::routes::router;

/// Every backend this binary can open.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Opens the configured bracket store. Called once per process.
pub async fn open_repository(db: &DbConfig) -> Result<Arc<dyn TaxRepository>> {
    debug!(backend = %db.backend, "connecting to bracket store");
    build_registry()
        .create(db)
        .await
        .with_context(|| format!("failed to open {} store '{}'", db.backend, db.connection_string))
}

pub async fn run(config: AppConfig) -> Result<()> {
    let repository = open_repository(&config.db).await?;
    let service = Arc::new(TaxService::new(repository));
    let app = router(service);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, backend = %config.db.backend, "tax api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("tax api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
}
