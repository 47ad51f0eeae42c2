//! HTTP middleware.

pub mod auth;

pub use auth::{require_bearer, AuthKey, PROVIDER_AUTH_HEADER};
