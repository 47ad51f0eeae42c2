//! Replication profiles
//!
//! A replication profile is the authorization record that permits a provider
//! to receive content from a dataset, plus the sealing/indexing policy used
//! when deals are made for that pair.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::profiles_routes;
