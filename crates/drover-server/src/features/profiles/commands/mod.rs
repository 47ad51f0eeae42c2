pub mod create;
pub mod delete;

pub use create::{CreateProfileCommand, CreateProfileError};
pub use delete::{DeleteProfileCommand, DeleteProfileError};
