//! Drover Server - Main entry point

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use drover_common::logging::{init_logging, LogConfig};
use tracing::{info, warn};

use drover_server::{
    api,
    config::Config,
    db,
    features::FeatureState,
    gateway::HttpDealGateway,
    reconcile::ReconcileLoop,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::from_env()?
        .with_defaults("drover-server", "drover_server=debug,tower_http=debug,sqlx=warn");
    init_logging(&log_config)?;

    info!("Starting drover server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    if config.gateway.dry_run {
        warn!("-- DRY RUN MODE (NO DEALS MADE) --");
    }

    let gateway = Arc::new(HttpDealGateway::new(&config.gateway)?);

    let _reconcile_handle = if config.reconcile.enabled {
        let handle = ReconcileLoop::new(
            pool.clone(),
            gateway.clone(),
            Duration::from_secs(config.reconcile.interval_secs),
        )
        .start();
        info!("Reconciliation loop started");
        Some(handle)
    } else {
        warn!("Reconciliation loop is disabled (RECONCILE_ENABLED=false)");
        None
    };

    let state = FeatureState {
        db: pool,
        gateway,
        dry_run: config.gateway.dry_run,
        service_token: config.gateway.service_token.clone(),
    };

    api::serve(&config, state).await
}
