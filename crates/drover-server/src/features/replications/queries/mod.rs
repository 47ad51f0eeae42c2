pub mod find_eligible;
pub mod list;
pub mod select_wallet;

pub use find_eligible::{FindEligibleError, FindEligibleQuery};
pub use list::{ListReplicationsError, ListReplicationsQuery, ReplicationPage};
pub use select_wallet::SelectWalletError;
