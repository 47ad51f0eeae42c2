pub mod create;

pub use create::{CreateDatasetCommand, CreateDatasetError};
