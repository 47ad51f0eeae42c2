//! Provider self-service
//!
//! Lets a storage provider request replication for itself, gated by its
//! capability token. Exactly one deal is made per call; providers invoke the
//! endpoint repeatedly to drain a backlog.

pub mod commands;
pub mod routes;

pub use commands::SelfServiceError;
pub use routes::self_service_routes;
