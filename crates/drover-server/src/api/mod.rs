//! HTTP server assembly.

pub mod response;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::features::{self, FeatureState};

/// Serve the API until shutdown is requested.
pub async fn serve(config: &Config, state: FeatureState) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Build the application router.
pub fn create_router(state: FeatureState) -> Router {
    let api_v1 = features::router(state.clone());

    Router::new()
        .route("/health", get(health))
        .with_state(state)
        .nest("/api/v1", api_v1)
        .fallback(unknown_endpoint)
        .layer(TraceLayer::new_for_http())
}

async fn unknown_endpoint() -> crate::error::AppError {
    crate::error::AppError::NotFound("no such endpoint".to_string())
}

/// Health check: proves the entity store is reachable.
async fn health(State(state): State<FeatureState>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Resolve when the process should shut down.
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give in-flight requests a moment to finish.
    tokio::time::sleep(std::time::Duration::from_secs(timeout_secs.min(5))).await;
}
