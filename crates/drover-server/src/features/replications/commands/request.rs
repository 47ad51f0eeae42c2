//! Operator replication request
//!
//! The operator-facing entry point: validates the target provider and
//! dataset, runs the eligibility query, resolves funding wallets, and hands
//! the batch to the deal orchestrator. An empty eligibility result is a
//! user-facing error at this layer, not in the resolver.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::features::replications::commands::make_deals::{
    self, DealSubmissionOutcome, MakeDealsCommand, MakeDealsError,
};
use crate::features::replications::queries::find_eligible::{self, FindEligibleQuery};
use crate::features::replications::queries::select_wallet::{resolve_wallets, SelectWalletError};
use crate::features::replications::types::{DealParams, DealParamsError};
use crate::gateway::{DealGateway, GatewayError};

/// Command to request replications to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestReplicationsCommand {
    pub provider: String,
    #[serde(default)]
    pub dataset_id: Option<i64>,
    #[serde(default)]
    pub num_deals: Option<i64>,
    #[serde(default)]
    pub delay_start_days: Option<i64>,
    #[serde(default)]
    pub advance_end_days: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestReplicationsError {
    #[error("provider '{0}' does not exist. please add it first")]
    ProviderNotFound(String),

    #[error("dataset with id {0} does not exist")]
    DatasetNotFound(i64),

    #[error("num_deals must be at least 1")]
    InvalidNumDeals,

    #[error(transparent)]
    Params(#[from] DealParamsError),

    #[error("no content eligible for replication to provider '{0}'. check replication profiles and quota")]
    NoEligibleContent(String),

    #[error("dataset {0} does not have a funding wallet. no deals were made")]
    NoWallet(i64),

    #[error("unable to make deals with gateway: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<SelectWalletError> for RequestReplicationsError {
    fn from(err: SelectWalletError) -> Self {
        match err {
            SelectWalletError::NoWallet(dataset_id) => Self::NoWallet(dataset_id),
            SelectWalletError::Database(e) => Self::Database(e),
        }
    }
}

impl From<MakeDealsError> for RequestReplicationsError {
    fn from(err: MakeDealsError) -> Self {
        match err {
            MakeDealsError::Gateway(e) => Self::Gateway(e),
            MakeDealsError::Database(e) => Self::Database(e),
        }
    }
}

/// Handles the operator replication request
#[tracing::instrument(skip(pool, gateway, auth_key, command), fields(provider = %command.provider))]
pub async fn handle(
    pool: SqlitePool,
    gateway: &dyn DealGateway,
    auth_key: &str,
    dry_run: bool,
    command: RequestReplicationsCommand,
) -> Result<DealSubmissionOutcome, RequestReplicationsError> {
    let params = DealParams::new(command.delay_start_days, command.advance_end_days)?;

    if let Some(n) = command.num_deals {
        if n < 1 {
            return Err(RequestReplicationsError::InvalidNumDeals);
        }
    }

    let provider_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM providers WHERE actor_id = ?)")
            .bind(&command.provider)
            .fetch_one(&pool)
            .await?;

    if !provider_exists {
        return Err(RequestReplicationsError::ProviderNotFound(command.provider));
    }

    if let Some(dataset_id) = command.dataset_id {
        if dataset_id != 0 {
            let dataset_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM datasets WHERE id = ?)")
                    .bind(dataset_id)
                    .fetch_one(&pool)
                    .await?;

            if !dataset_exists {
                return Err(RequestReplicationsError::DatasetNotFound(dataset_id));
            }
        }
    }

    let eligible = find_eligible::handle(
        pool.clone(),
        FindEligibleQuery {
            provider_actor_id: command.provider.clone(),
            dataset_id: command.dataset_id,
            limit: command.num_deals,
            require_location: false,
        },
    )
    .await
    .map_err(|e| match e {
        find_eligible::FindEligibleError::Database(e) => RequestReplicationsError::Database(e),
    })?;

    if eligible.is_empty() {
        return Err(RequestReplicationsError::NoEligibleContent(command.provider));
    }

    let candidates = resolve_wallets(pool.clone(), eligible).await?;

    let outcome = make_deals::handle(
        pool,
        gateway,
        auth_key,
        MakeDealsCommand {
            provider_actor_id: command.provider,
            candidates,
            params,
            is_self_service: false,
            dry_run,
        },
    )
    .await?;

    Ok(outcome)
}
