//! Funding wallet associations
//!
//! Wallets fund deals for the datasets they are associated with. Drover never
//! holds keys; it only records which wallet addresses may fund which
//! datasets.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::wallets_routes;
