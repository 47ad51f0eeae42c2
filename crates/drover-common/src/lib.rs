//! Drover Common Library
//!
//! Shared error handling and logging bootstrap for the drover workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the [`DroverError`] type and [`Result`] alias used
//!   across workspace members
//! - **Logging**: tracing subscriber configuration shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use drover_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> drover_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{DroverError, Result};
