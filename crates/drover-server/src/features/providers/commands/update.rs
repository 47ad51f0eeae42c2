//! Update provider command

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::models::Provider;

/// Command to update a provider's mutable fields. An empty display name
/// leaves the stored one unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProviderCommand {
    #[serde(skip)]
    pub actor_id: String,
    #[serde(default)]
    pub display_name: String,
    pub allow_self_service: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateProviderError {
    #[error("Provider with actor id '{0}' not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the update provider command
#[tracing::instrument(skip(pool, command), fields(actor_id = %command.actor_id))]
pub async fn handle(
    pool: SqlitePool,
    command: UpdateProviderCommand,
) -> Result<Provider, UpdateProviderError> {
    let provider = sqlx::query_as::<_, Provider>(
        "UPDATE providers
         SET display_name = CASE WHEN ? = '' THEN display_name ELSE ? END,
             allow_self_service = ?
         WHERE actor_id = ?
         RETURNING actor_id, display_name, allow_self_service, self_service_key",
    )
    .bind(&command.display_name)
    .bind(&command.display_name)
    .bind(command.allow_self_service)
    .bind(&command.actor_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| UpdateProviderError::NotFound(command.actor_id.clone()))?;

    Ok(provider)
}
