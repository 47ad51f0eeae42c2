//! Create replication profile command

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::is_unique_violation;
use crate::models::ReplicationProfile;

/// Command to create a replication profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileCommand {
    pub provider_actor_id: String,
    pub dataset_id: i64,
    #[serde(default)]
    pub unsealed: bool,
    #[serde(default)]
    pub indexed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateProfileError {
    #[error("Provider with actor id '{0}' not found")]
    ProviderNotFound(String),

    #[error("Dataset with id '{0}' not found")]
    DatasetNotFound(i64),

    #[error("Replication profile for provider '{0}' and dataset {1} already exists")]
    Duplicate(String, i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the create profile command
#[tracing::instrument(skip(pool, command), fields(provider = %command.provider_actor_id, dataset_id = command.dataset_id))]
pub async fn handle(
    pool: SqlitePool,
    command: CreateProfileCommand,
) -> Result<ReplicationProfile, CreateProfileError> {
    let provider_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM providers WHERE actor_id = ?)")
            .bind(&command.provider_actor_id)
            .fetch_one(&pool)
            .await?;

    if !provider_exists {
        return Err(CreateProfileError::ProviderNotFound(
            command.provider_actor_id,
        ));
    }

    let dataset_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM datasets WHERE id = ?)")
            .bind(command.dataset_id)
            .fetch_one(&pool)
            .await?;

    if !dataset_exists {
        return Err(CreateProfileError::DatasetNotFound(command.dataset_id));
    }

    let profile = sqlx::query_as::<_, ReplicationProfile>(
        "INSERT INTO replication_profiles (provider_actor_id, dataset_id, unsealed, indexed)
         VALUES (?, ?, ?, ?)
         RETURNING provider_actor_id, dataset_id, unsealed, indexed",
    )
    .bind(&command.provider_actor_id)
    .bind(command.dataset_id)
    .bind(command.unsealed)
    .bind(command.indexed)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            CreateProfileError::Duplicate(command.provider_actor_id.clone(), command.dataset_id)
        } else {
            CreateProfileError::Database(e)
        }
    })?;

    tracing::info!("replication profile created");

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_dataset, seed_provider, test_pool};

    #[tokio::test]
    async fn test_create_profile() {
        let pool = test_pool().await;
        let dataset_id = seed_dataset(&pool, "ds", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;

        let profile = handle(
            pool.clone(),
            CreateProfileCommand {
                provider_actor_id: "f01000".to_string(),
                dataset_id,
                unsealed: true,
                indexed: false,
            },
        )
        .await
        .unwrap();

        assert!(profile.unsealed);
        assert!(!profile.indexed);
    }

    #[tokio::test]
    async fn test_referential_checks() {
        let pool = test_pool().await;
        let dataset_id = seed_dataset(&pool, "ds", 3, 200).await;

        let result = handle(
            pool.clone(),
            CreateProfileCommand {
                provider_actor_id: "f09999".to_string(),
                dataset_id,
                unsealed: false,
                indexed: false,
            },
        )
        .await;
        assert!(matches!(result, Err(CreateProfileError::ProviderNotFound(_))));

        seed_provider(&pool, "f01000", "key", true).await;
        let result = handle(
            pool,
            CreateProfileCommand {
                provider_actor_id: "f01000".to_string(),
                dataset_id: 99,
                unsealed: false,
                indexed: false,
            },
        )
        .await;
        assert!(matches!(result, Err(CreateProfileError::DatasetNotFound(99))));
    }

    #[tokio::test]
    async fn test_duplicate_pair() {
        let pool = test_pool().await;
        let dataset_id = seed_dataset(&pool, "ds", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;

        let command = CreateProfileCommand {
            provider_actor_id: "f01000".to_string(),
            dataset_id,
            unsealed: false,
            indexed: false,
        };
        handle(pool.clone(), command.clone()).await.unwrap();
        let result = handle(pool, command).await;
        assert!(matches!(result, Err(CreateProfileError::Duplicate(_, _))));
    }
}
