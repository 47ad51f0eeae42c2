pub mod by_dataset;
pub mod by_piece;

use sqlx::SqlitePool;

use crate::features::replications::commands::MakeDealsError;
use crate::features::replications::types::DealParamsError;
use crate::gateway::GatewayError;
use crate::models::Provider;

/// Errors shared by the self-service commands.
#[derive(Debug, thiserror::Error)]
pub enum SelfServiceError {
    #[error("unable to find provider for token")]
    InvalidToken,

    #[error("provider '{0}' is not permitted to use self-service")]
    SelfServiceDisabled(String),

    #[error("provider '{0}' is not authorized for dataset '{1}'")]
    NotAuthorized(String, String),

    #[error("unknown piece '{0}'")]
    UnknownPiece(String),

    #[error("dataset with id {0} does not exist")]
    DatasetNotFound(i64),

    #[error("content '{0}' has reached its replication quota of {1}")]
    QuotaReached(String, i64),

    #[error("content '{0}' is already replicated to provider '{1}'")]
    AlreadyReplicated(String, String),

    #[error("no deals available for dataset")]
    NoEligibleContent,

    #[error("dataset '{0}' does not have a funding wallet. please contact the administrator")]
    NoWallet(String),

    #[error(transparent)]
    Params(#[from] DealParamsError),

    #[error("unable to make deal with gateway: {0}")]
    Gateway(GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MakeDealsError> for SelfServiceError {
    fn from(err: MakeDealsError) -> Self {
        match err {
            MakeDealsError::Gateway(e) => Self::Gateway(e),
            MakeDealsError::Database(e) => Self::Database(e),
        }
    }
}

/// Resolve the provider presenting a capability token and check that it may
/// use self-service at all.
pub(crate) async fn resolve_provider(
    pool: &SqlitePool,
    token: &str,
) -> Result<Provider, SelfServiceError> {
    if token.is_empty() {
        return Err(SelfServiceError::InvalidToken);
    }

    let provider = sqlx::query_as::<_, Provider>(
        "SELECT actor_id, display_name, allow_self_service, self_service_key
         FROM providers WHERE self_service_key = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?
    .ok_or(SelfServiceError::InvalidToken)?;

    if !provider.allow_self_service {
        return Err(SelfServiceError::SelfServiceDisabled(provider.actor_id));
    }

    Ok(provider)
}
