//! Replication orchestration
//!
//! The heart of drover: decides which content a provider may still receive
//! (eligibility), picks the funding wallet, turns candidates into deal
//! gateway requests, and records provisional replication state. The
//! background loop in [`crate::reconcile`] later converges that state with
//! the gateway's outcomes.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::replications_routes;
