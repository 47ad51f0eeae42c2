//! Self-service replication of one specific piece.
//!
//! Because a single piece is targeted rather than a query-derived set, the
//! quota and duplicate-replication checks are performed here explicitly
//! before the deal is submitted.

use sqlx::SqlitePool;

use crate::features::replications::commands::make_deals::{
    self, DealSubmissionOutcome, MakeDealsCommand,
};
use crate::features::replications::queries::select_wallet::{self, SelectWalletError};
use crate::features::replications::types::{DealCandidate, DealParams, EligibleContent};
use crate::gateway::DealGateway;
use crate::models::{Content, Dataset, ReplicationProfile, ReplicationStatus};

use super::{resolve_provider, SelfServiceError};

/// Handles a by-piece self-service request
#[tracing::instrument(skip(pool, gateway, service_token, provider_token), fields(piece_cid = %piece_cid))]
pub async fn handle(
    pool: SqlitePool,
    gateway: &dyn DealGateway,
    service_token: &str,
    dry_run: bool,
    provider_token: &str,
    piece_cid: &str,
    params: DealParams,
) -> Result<DealSubmissionOutcome, SelfServiceError> {
    let provider = resolve_provider(&pool, provider_token).await?;

    let content = sqlx::query_as::<_, Content>(
        "SELECT piece_cid, payload_cid, size, padded_size, dataset_id, num_replications,
                content_location
         FROM contents WHERE piece_cid = ?",
    )
    .bind(piece_cid)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| SelfServiceError::UnknownPiece(piece_cid.to_string()))?;

    let dataset = sqlx::query_as::<_, Dataset>(
        "SELECT id, name, replication_quota, deal_duration_days, created_at
         FROM datasets WHERE id = ?",
    )
    .bind(content.dataset_id)
    .fetch_one(&pool)
    .await?;

    let profile = sqlx::query_as::<_, ReplicationProfile>(
        "SELECT provider_actor_id, dataset_id, unsealed, indexed
         FROM replication_profiles WHERE provider_actor_id = ? AND dataset_id = ?",
    )
    .bind(&provider.actor_id)
    .bind(dataset.id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| {
        SelfServiceError::NotAuthorized(provider.actor_id.clone(), dataset.name.clone())
    })?;

    if content.num_replications >= dataset.replication_quota {
        return Err(SelfServiceError::QuotaReached(
            content.piece_cid,
            dataset.replication_quota,
        ));
    }

    // A PENDING or SUCCESS replication to this provider blocks the request;
    // a prior FAILURE does not.
    let already_replicated: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM replications
            WHERE piece_cid = ? AND provider_actor_id = ? AND status <> ?)",
    )
    .bind(&content.piece_cid)
    .bind(&provider.actor_id)
    .bind(ReplicationStatus::Failure)
    .fetch_one(&pool)
    .await?;

    if already_replicated {
        return Err(SelfServiceError::AlreadyReplicated(
            content.piece_cid,
            provider.actor_id,
        ));
    }

    let wallet = select_wallet::handle(pool.clone(), dataset.id)
        .await
        .map_err(|e| match e {
            SelectWalletError::NoWallet(_) => SelfServiceError::NoWallet(dataset.name.clone()),
            SelectWalletError::Database(e) => SelfServiceError::Database(e),
        })?;

    let candidate = DealCandidate {
        content: EligibleContent {
            piece_cid: content.piece_cid,
            payload_cid: content.payload_cid,
            size: content.size,
            padded_size: content.padded_size,
            dataset_id: dataset.id,
            dataset_name: dataset.name,
            deal_duration_days: dataset.deal_duration_days,
            unsealed: profile.unsealed,
            indexed: profile.indexed,
        },
        wallet_address: wallet.address,
    };

    let outcome = make_deals::handle(
        pool,
        gateway,
        service_token,
        MakeDealsCommand {
            provider_actor_id: provider.actor_id,
            candidates: vec![candidate],
            params,
            is_self_service: true,
            dry_run,
        },
    )
    .await?;

    Ok(outcome)
}
