//! Self-service replication from a dataset backlog.
//!
//! Hands out one deal at a time: the eligibility query is capped at a single
//! candidate, restricted to downloadable content (the provider must fetch the
//! piece itself).

use sqlx::SqlitePool;

use crate::features::replications::commands::make_deals::{
    self, DealSubmissionOutcome, MakeDealsCommand,
};
use crate::features::replications::queries::find_eligible::{self, FindEligibleQuery};
use crate::features::replications::queries::select_wallet::{self, SelectWalletError};
use crate::features::replications::types::{DealCandidate, DealParams};
use crate::gateway::DealGateway;

use super::{resolve_provider, SelfServiceError};

/// Handles a by-dataset self-service request
#[tracing::instrument(skip(pool, gateway, service_token, provider_token), fields(dataset_id = dataset_id))]
pub async fn handle(
    pool: SqlitePool,
    gateway: &dyn DealGateway,
    service_token: &str,
    dry_run: bool,
    provider_token: &str,
    dataset_id: i64,
    params: DealParams,
) -> Result<DealSubmissionOutcome, SelfServiceError> {
    let provider = resolve_provider(&pool, provider_token).await?;

    let dataset_name: String = sqlx::query_scalar("SELECT name FROM datasets WHERE id = ?")
        .bind(dataset_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(SelfServiceError::DatasetNotFound(dataset_id))?;

    let authorized: bool = sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM replication_profiles
            WHERE provider_actor_id = ? AND dataset_id = ?)",
    )
    .bind(&provider.actor_id)
    .bind(dataset_id)
    .fetch_one(&pool)
    .await?;

    if !authorized {
        return Err(SelfServiceError::NotAuthorized(
            provider.actor_id,
            dataset_name,
        ));
    }

    // One deal per call.
    let mut eligible = find_eligible::handle(
        pool.clone(),
        FindEligibleQuery {
            provider_actor_id: provider.actor_id.clone(),
            dataset_id: Some(dataset_id),
            limit: Some(1),
            require_location: true,
        },
    )
    .await
    .map_err(|e| match e {
        find_eligible::FindEligibleError::Database(e) => SelfServiceError::Database(e),
    })?;

    let Some(content) = eligible.pop() else {
        return Err(SelfServiceError::NoEligibleContent);
    };

    let wallet = select_wallet::handle(pool.clone(), dataset_id)
        .await
        .map_err(|e| match e {
            SelectWalletError::NoWallet(_) => SelfServiceError::NoWallet(dataset_name.clone()),
            SelectWalletError::Database(e) => SelfServiceError::Database(e),
        })?;

    let candidate = DealCandidate {
        content,
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
