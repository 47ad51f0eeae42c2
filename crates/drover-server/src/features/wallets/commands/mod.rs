pub mod associate;

pub use associate::{AssociateWalletCommand, AssociateWalletError};
