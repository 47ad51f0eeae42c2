//! Deal orchestration
//!
//! Turns eligible content into deal gateway requests and records provisional
//! replication state. In live mode the whole batch goes to the gateway in one
//! call; for every accepted element a PENDING replication row is written and
//! the content's replication counter incremented, both in one transaction so
//! a later failure rollback is exact. Rejected elements are not persisted;
//! the caller gets the full gateway response for diagnostics.
//!
//! Dry-run mode never contacts the gateway: it fabricates an accepted result
//! per candidate and records the replication as immediately successful, with
//! the same counter handling as live mode.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::features::replications::types::{DealCandidate, DealParams};
use crate::gateway::types::{DealRequest, DealResult, DealWallet, PieceCommitment, SUBMIT_STATUS_SUCCESS};
use crate::gateway::{DealGateway, GatewayError};
use crate::models::{ReplicationStatus, PENDING_PROPOSAL_PREFIX};

/// Message recorded on replications created by a dry run.
pub const DRY_RUN_MESSAGE: &str = "dry run: deal recorded locally, gateway not contacted";

/// Command to submit deals for a batch of candidates
#[derive(Debug, Clone)]
pub struct MakeDealsCommand {
    pub provider_actor_id: String,
    pub candidates: Vec<DealCandidate>,
    pub params: DealParams,
    pub is_self_service: bool,
    pub dry_run: bool,
}

/// Result of a submission batch.
#[derive(Debug, Clone, Serialize)]
pub struct DealSubmissionOutcome {
    /// One element per submitted request, as reported by the gateway (or
    /// synthesized in dry-run mode).
    pub results: Vec<DealResult>,
    /// Number of replication rows recorded.
    pub replications_created: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum MakeDealsError {
    #[error("unable to make deals with gateway: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the make deals command
#[tracing::instrument(skip(pool, gateway, auth_key, command), fields(provider = %command.provider_actor_id, candidates = command.candidates.len(), dry_run = command.dry_run))]
pub async fn handle(
    pool: SqlitePool,
    gateway: &dyn DealGateway,
    auth_key: &str,
    command: MakeDealsCommand,
) -> Result<DealSubmissionOutcome, MakeDealsError> {
    // An empty batch is the caller's problem to report; nothing to submit.
    if command.candidates.is_empty() {
        return Ok(DealSubmissionOutcome {
            results: Vec::new(),
            replications_created: 0,
        });
    }

    if command.dry_run {
        return dry_run(pool, command).await;
    }

    let requests: Vec<DealRequest> = command
        .candidates
        .iter()
        .map(|c| build_request(c, &command.provider_actor_id, command.params))
        .collect();

    let results = gateway.submit_deals(&requests, auth_key).await?;

    let mut created = 0;
    for result in &results {
        if !result.is_success() {
            tracing::debug!(
                piece_cid = %result.request_meta.piece_commitment.piece_cid,
                status = %result.status,
                "gateway did not accept deal request"
            );
            continue;
        }

        // Match by the echoed request metadata, not by element position.
        match record_pending(&pool, result, command.is_self_service).await {
            Ok(()) => created += 1,
            Err(e) => {
                tracing::error!(
                    gateway_content_id = result.content_id,
                    error = %e,
                    "unable to record replication"
                );
            }
        }
    }

    tracing::info!(
        submitted = results.len(),
        recorded = created,
        "deal batch submitted"
    );

    Ok(DealSubmissionOutcome {
        results,
        replications_created: created,
    })
}

/// Build the gateway request for one candidate.
fn build_request(candidate: &DealCandidate, provider_actor_id: &str, params: DealParams) -> DealRequest {
    let content = &candidate.content;

    DealRequest {
        payload_cid: content.payload_cid.clone(),
        wallet: DealWallet {
            address: candidate.wallet_address.clone(),
        },
        provider_id: provider_actor_id.to_string(),
        connection_mode: "import".to_string(),
        size: content.size,
        piece_commitment: PieceCommitment {
            piece_cid: content.piece_cid.clone(),
            padded_piece_size: content.padded_size,
        },
        duration_in_days: content.deal_duration_days - params.advance_end_days,
        start_delay_in_days: params.delay_start_days,
        skip_ipni_announce: !content.indexed,
        remove_unsealed_copy: !content.unsealed,
    }
}

/// Insert a PENDING replication and bump the content's replication counter in
/// one transaction.
async fn record_pending(
    pool: &SqlitePool,
    result: &DealResult,
    is_self_service: bool,
) -> Result<(), sqlx::Error> {
    let piece_cid = &result.request_meta.piece_commitment.piece_cid;
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO replications
            (piece_cid, provider_actor_id, gateway_content_id, proposal_cid, deal_time, status,
             status_message, is_self_service)
         VALUES (?, ?, ?, ?, ?, ?, '', ?)",
    )
    .bind(piece_cid)
    .bind(&result.request_meta.provider_id)
    .bind(result.content_id)
    .bind(format!("{}{}", PENDING_PROPOSAL_PREFIX, Uuid::new_v4()))
    .bind(Utc::now())
    .bind(ReplicationStatus::Pending)
    .bind(is_self_service)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE contents SET num_replications = num_replications + 1 WHERE piece_cid = ?")
        .bind(piece_cid)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Dry-run path: fabricate an accepted result per candidate and record the
/// replication as already successful. Synthetic gateway ids are negative so
/// they can never collide with ids issued by a real gateway.
async fn dry_run(
    pool: SqlitePool,
    command: MakeDealsCommand,
) -> Result<DealSubmissionOutcome, MakeDealsError> {
    let base = Utc::now().timestamp_micros();
    let mut results = Vec::with_capacity(command.candidates.len());
    let mut created = 0;

    for (i, candidate) in command.candidates.iter().enumerate() {
        let request = build_request(candidate, &command.provider_actor_id, command.params);
        let gateway_content_id = -(base + i as i64);

        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO replications
                (piece_cid, provider_actor_id, gateway_content_id, proposal_cid, deal_time, status,
                 status_message, is_self_service)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&candidate.content.piece_cid)
        .bind(&command.provider_actor_id)
        .bind(gateway_content_id)
        .bind(format!("{}{}", PENDING_PROPOSAL_PREFIX, Uuid::new_v4()))
        .bind(Utc::now())
        .bind(ReplicationStatus::Success)
        .bind(DRY_RUN_MESSAGE)
        .bind(command.is_self_service)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE contents SET num_replications = num_replications + 1 WHERE piece_cid = ?",
        )
        .bind(&candidate.content.piece_cid)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        created += 1;
        results.push(DealResult {
            status: SUBMIT_STATUS_SUCCESS.to_string(),
            message: DRY_RUN_MESSAGE.to_string(),
            content_id: gateway_content_id,
            piece_commitment_id: 0,
            request_meta: request,
        });
    }

    tracing::info!(recorded = created, "dry run deal batch recorded");

    Ok(DealSubmissionOutcome {
        results,
        replications_created: created,
    })
}
