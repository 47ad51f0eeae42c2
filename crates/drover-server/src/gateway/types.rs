//! Deal gateway wire types and the boundary mapping from the gateway's
//! free-form status vocabulary into [`ReplicationStatus`].
//!
//! Gateway status strings never leave this module; everything downstream
//! works with the closed PENDING/SUCCESS/FAILURE enum.

use serde::{Deserialize, Serialize};

use crate::models::ReplicationStatus;

/// Per-element status the gateway reports for an accepted submission.
pub const SUBMIT_STATUS_SUCCESS: &str = "success";

// Content statuses reported by the gateway's status endpoint.
pub const CONTENT_DEAL_PROPOSAL_SENT: &str = "deal-proposal-sent";
pub const CONTENT_DEAL_PROPOSAL_FAILED: &str = "deal-proposal-failed";
pub const CONTENT_TRANSFER_FAILED: &str = "transfer-failed";

/// One deal request submitted to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRequest {
    pub payload_cid: String,
    pub wallet: DealWallet,
    pub provider_id: String,
    pub connection_mode: String,
    pub size: i64,
    pub piece_commitment: PieceCommitment,
    pub duration_in_days: i64,
    pub start_delay_in_days: i64,
    pub skip_ipni_announce: bool,
    pub remove_unsealed_copy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealWallet {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceCommitment {
    pub piece_cid: String,
    pub padded_piece_size: i64,
}

/// One element of the gateway's submission response. Elements are matched to
/// requests by the echoed request metadata, not by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealResult {
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub content_id: i64,
    #[serde(default)]
    pub piece_commitment_id: i64,
    pub request_meta: DealRequest,
}

impl DealResult {
    pub fn is_success(&self) -> bool {
        self.status == SUBMIT_STATUS_SUCCESS
    }
}

/// One element of the gateway's deal status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealStatus {
    pub content: DealStatusContent,
    #[serde(default)]
    pub deal_proposals: Vec<DealProposal>,
    #[serde(default)]
    pub deals: Vec<OnChainDeal>,
    #[serde(default)]
    pub piece_commitments: Vec<PieceCommitmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealStatusContent {
    #[serde(rename = "ID")]
    pub id: i64,
    pub status: String,
    #[serde(default)]
    pub last_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealProposal {
    #[serde(default)]
    pub signed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnChainDeal {
    #[serde(default, rename = "propCid")]
    pub proposal_cid: String,
    #[serde(default, rename = "dealUuid")]
    pub deal_uuid: String,
    #[serde(default, rename = "dealId")]
    pub deal_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PieceCommitmentStatus {
    #[serde(default)]
    pub piece: String,
}

/// A state transition derived from one gateway status record, keyed by the
/// gateway content id.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationUpdate {
    pub gateway_content_id: i64,
    pub status: ReplicationStatus,
    pub proposal_cid: Option<String>,
    pub deal_uuid: Option<String>,
    pub on_chain_deal_id: Option<i64>,
    pub message: String,
}

/// Map a gateway status record to a replication update.
///
/// Returns `None` for intermediate statuses (the deal is still in flight and
/// the local row stays PENDING).
pub fn derive_update(status: &DealStatus) -> Option<ReplicationUpdate> {
    match status.content.status.as_str() {
        CONTENT_DEAL_PROPOSAL_SENT => Some(ReplicationUpdate {
            gateway_content_id: status.content.id,
            status: ReplicationStatus::Success,
            proposal_cid: status
                .deal_proposals
                .first()
                .map(|p| p.signed.clone())
                .or_else(|| status.deals.first().map(|d| d.proposal_cid.clone())),
            deal_uuid: status.deals.first().map(|d| d.deal_uuid.clone()),
            on_chain_deal_id: status.deals.first().map(|d| d.deal_id),
            message: status.content.last_message.clone(),
        }),
        CONTENT_DEAL_PROPOSAL_FAILED | CONTENT_TRANSFER_FAILED => Some(ReplicationUpdate {
            gateway_content_id: status.content.id,
            status: ReplicationStatus::Failure,
            proposal_cid: status.deal_proposals.first().map(|p| p.signed.clone()),
            deal_uuid: None,
            on_chain_deal_id: None,
            message: status.content.last_message.clone(),
        }),
        _ => None,
    }
}
