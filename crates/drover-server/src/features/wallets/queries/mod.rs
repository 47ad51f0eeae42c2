pub mod list;

pub use list::{ListWalletsError, ListWalletsQuery};
