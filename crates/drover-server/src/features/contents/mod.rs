//! Content inventory
//!
//! Content pieces are attached to a dataset by bulk import and are immutable
//! afterwards, except for the replication counter maintained by the deal
//! orchestrator and the reconciliation loop.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::contents_routes;
