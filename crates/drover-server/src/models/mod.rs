//! Domain records stored in the drover database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Prefix marking a proposal id as not yet confirmed by the deal gateway.
/// Replaced with the real proposal cid during reconciliation.
pub const PENDING_PROPOSAL_PREFIX: &str = "PENDING_";

/// Lifecycle of a replication attempt.
///
/// Rows are created PENDING by the deal orchestrator. Only the reconciliation
/// loop moves a row to SUCCESS or FAILURE, and terminal rows never change
/// again. A FAILURE does not block a later attempt for the same
/// content/provider pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplicationStatus {
    #[default]
    Pending,
    Success,
    Failure,
}

impl std::fmt::Display for ReplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplicationStatus::Pending => write!(f, "PENDING"),
            ReplicationStatus::Success => write!(f, "SUCCESS"),
            ReplicationStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

impl std::str::FromStr for ReplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(ReplicationStatus::Pending),
            "SUCCESS" => Ok(ReplicationStatus::Success),
            "FAILURE" => Ok(ReplicationStatus::Failure),
            _ => Err(format!("unknown replication status '{}'", s)),
        }
    }
}

/// A dataset is a collection of content pieces, identified by a slug.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dataset {
    pub id: i64,
    pub name: String,
    /// Maximum number of concurrent or successful replications per piece.
    pub replication_quota: i64,
    pub deal_duration_days: i64,
    pub created_at: DateTime<Utc>,
}

/// An immutable content piece belonging to exactly one dataset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Content {
    pub piece_cid: String,
    pub payload_cid: String,
    pub size: i64,
    pub padded_size: i64,
    pub dataset_id: i64,
    pub num_replications: i64,
    pub content_location: Option<String>,
}

/// A storage provider that content is replicated to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Provider {
    pub actor_id: String,
    pub display_name: String,
    pub allow_self_service: bool,
    /// Opaque capability token presented by the provider on self-service
    /// requests.
    pub self_service_key: String,
}

/// Authorization and policy record permitting a provider to receive content
/// from a specific dataset. Presence of the row is the authorization gate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReplicationProfile {
    pub provider_actor_id: String,
    pub dataset_id: i64,
    pub unsealed: bool,
    pub indexed: bool,
}

/// A funding wallet. Associated with datasets many-to-many; balances live at
/// the gateway and are not stored here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub address: String,
}

/// One attempt to place a content piece with a provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Replication {
    pub id: i64,
    pub piece_cid: String,
    pub provider_actor_id: String,
    /// Opaque id the deal gateway assigned to this submission; the key used
    /// when polling deal status.
    pub gateway_content_id: i64,
    pub proposal_cid: String,
    pub deal_uuid: String,
    pub on_chain_deal_id: i64,
    pub deal_time: DateTime<Utc>,
    pub status: ReplicationStatus,
    pub status_message: String,
    pub is_self_service: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReplicationStatus::Pending,
            ReplicationStatus::Success,
            ReplicationStatus::Failure,
        ] {
            assert_eq!(
                ReplicationStatus::from_str(&status.to_string()).unwrap(),
                status
            );
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            ReplicationStatus::from_str("failure").unwrap(),
            ReplicationStatus::Failure
        );
        assert!(ReplicationStatus::from_str("COMPLETE").is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&ReplicationStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }
}
