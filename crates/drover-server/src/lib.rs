//! Drover Server Library
//!
//! Daemon that coordinates replication of immutable content pieces from
//! dataset owners to storage providers.
//!
//! # Overview
//!
//! Drover keeps an inventory of datasets, their content pieces, the storage
//! providers allowed to replicate them, and the wallets that fund deals. It
//! does not negotiate storage deals itself: deal-making is delegated to an
//! external deal gateway, and a background reconciliation loop converges
//! local replication state with the gateway's asynchronous outcomes.
//!
//! - **API Endpoints**: REST API for datasets, contents, providers,
//!   replication profiles, wallets and replications
//! - **Deal Gateway Client**: batch deal submission and status polling
//! - **Reconciliation Loop**: periodic convergence of pending replications,
//!   including quota rollback on failed deals
//! - **Self Service**: capability-token gated endpoints that let a provider
//!   request one deal at a time for itself
//!
//! # Architecture
//!
//! Features are organized as vertical slices: each feature owns its
//! `commands/` (write operations), `queries/` (read operations) and
//! `routes.rs` (HTTP wiring). Replication state has exactly three statuses —
//! PENDING, SUCCESS, FAILURE — and only the reconciliation loop moves a row
//! into a terminal state.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: SQLite entity store, embedded migrations
//! - **Reqwest**: deal gateway HTTP client

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod gateway;
pub mod middleware;
pub mod models;
pub mod reconcile;

#[cfg(test)]
pub mod test_util;

// Re-export commonly used types
pub use error::{AppError, AppResult};
