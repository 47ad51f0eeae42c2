pub mod make_deals;
pub mod request;

pub use make_deals::{DealSubmissionOutcome, MakeDealsCommand, MakeDealsError};
pub use request::{RequestReplicationsCommand, RequestReplicationsError};
