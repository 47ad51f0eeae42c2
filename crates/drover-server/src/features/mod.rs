//! Feature modules implementing the drover API
//!
//! Each feature is organized as a vertical slice with its own commands,
//! queries, and routes:
//!
//! - **datasets**: dataset registration and listing
//! - **contents**: bulk content import and listing
//! - **providers**: storage provider registration and updates
//! - **profiles**: replication profiles (dataset-provider authorization)
//! - **wallets**: funding wallet associations
//! - **replications**: eligibility, deal orchestration, replication listing
//! - **self_service**: capability-token gated provider-initiated deals

pub mod contents;
pub mod datasets;
pub mod profiles;
pub mod providers;
pub mod replications;
pub mod self_service;
pub mod shared;
pub mod wallets;

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use crate::gateway::DealGateway;
use crate::middleware;

/// Shared state for feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// SQLite connection pool for the entity store
    pub db: SqlitePool,
    /// Deal gateway client
    pub gateway: Arc<dyn DealGateway>,
    /// When set, submissions are recorded locally without contacting the
    /// gateway
    pub dry_run: bool,
    /// Service-level gateway token used for self-service submissions
    pub service_token: String,
}

/// Creates the main API router with all feature routes mounted
///
/// Operator routes require a bearer key (forwarded to the deal gateway on
/// submission); self-service routes authenticate with the per-provider
/// capability token instead.
pub fn router(state: FeatureState) -> Router<()> {
    let operator = Router::new()
        .nest("/datasets", datasets::datasets_routes().with_state(state.db.clone()))
        .nest("/contents", contents::contents_routes().with_state(state.db.clone()))
        .nest("/providers", providers::providers_routes().with_state(state.db.clone()))
        .nest(
            "/replication-profiles",
            profiles::profiles_routes().with_state(state.db.clone()),
        )
        .nest("/wallets", wallets::wallets_routes().with_state(state.db.clone()))
        .nest(
            "/replications",
            replications::replications_routes().with_state(state.clone()),
        )
        .route_layer(axum::middleware::from_fn(middleware::require_bearer));

    Router::new().merge(operator).nest(
        "/self-service",
        self_service::self_service_routes().with_state(state),
    )
}
