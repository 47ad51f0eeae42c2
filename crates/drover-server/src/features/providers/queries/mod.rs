pub mod list;

pub use list::ListProvidersError;
