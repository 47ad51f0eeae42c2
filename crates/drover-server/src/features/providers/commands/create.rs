//! Create provider command
//!
//! Registers a storage provider. The self-service capability token is
//! generated here and returned once in the response; it is the credential the
//! provider presents on self-service requests.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::features::shared::validation::{validate_actor_id, ActorIdValidationError};
use crate::models::Provider;

/// Command to create a new provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderCommand {
    pub actor_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_allow_self_service")]
    pub allow_self_service: bool,
}

fn default_allow_self_service() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum CreateProviderError {
    #[error("Actor id validation failed: {0}")]
    ActorIdValidation(#[from] ActorIdValidationError),

    #[error("Provider with actor id '{0}' already exists")]
    DuplicateActorId(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the create provider command
#[tracing::instrument(skip(pool, command), fields(actor_id = %command.actor_id))]
pub async fn handle(
    pool: SqlitePool,
    command: CreateProviderCommand,
) -> Result<Provider, CreateProviderError> {
    validate_actor_id(&command.actor_id, 64)?;

    let self_service_key = Uuid::new_v4().to_string();

    let provider = sqlx::query_as::<_, Provider>(
        "INSERT INTO providers (actor_id, display_name, allow_self_service, self_service_key)
         VALUES (?, ?, ?, ?)
         RETURNING actor_id, display_name, allow_self_service, self_service_key",
    )
    .bind(&command.actor_id)
    .bind(&command.display_name)
    .bind(command.allow_self_service)
    .bind(&self_service_key)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            CreateProviderError::DuplicateActorId(command.actor_id.clone())
        } else {
            CreateProviderError::Database(e)
        }
    })?;

    tracing::info!(actor_id = %provider.actor_id, "provider created");

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_pool;

    fn command(actor_id: &str) -> CreateProviderCommand {
        CreateProviderCommand {
            actor_id: actor_id.to_string(),
            display_name: "Test SP".to_string(),
            allow_self_service: true,
        }
    }

    #[tokio::test]
    async fn test_create_generates_key() {
        let pool = test_pool().await;
        let provider = handle(pool.clone(), command("f01000")).await.unwrap();

        assert_eq!(provider.actor_id, "f01000");
        assert!(!provider.self_service_key.is_empty());

        let again = handle(pool, command("f01001")).await.unwrap();
        assert_ne!(provider.self_service_key, again.self_service_key);
    }

    #[tokio::test]
    async fn test_duplicate_actor_id() {
        let pool = test_pool().await;
        handle(pool.clone(), command("f01000")).await.unwrap();
        let result = handle(pool, command("f01000")).await;
        assert!(matches!(result, Err(CreateProviderError::DuplicateActorId(_))));
    }

    #[tokio::test]
    async fn test_invalid_actor_id() {
        let pool = test_pool().await;
        let result = handle(pool, command("")).await;
        assert!(matches!(result, Err(CreateProviderError::ActorIdValidation(_))));
    }
}
