//! Storage provider management

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::providers_routes;
