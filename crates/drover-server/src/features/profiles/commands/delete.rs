//! Delete replication profile command
//!
//! Removing the profile revokes the provider's authorization for the dataset;
//! existing replications are untouched.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Command to delete a replication profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProfileCommand {
    pub provider_actor_id: String,
    pub dataset_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteProfileError {
    #[error("Replication profile for provider '{0}' and dataset {1} not found")]
    NotFound(String, i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the delete profile command
#[tracing::instrument(skip(pool, command), fields(provider = %command.provider_actor_id, dataset_id = command.dataset_id))]
pub async fn handle(
    pool: SqlitePool,
    command: DeleteProfileCommand,
) -> Result<(), DeleteProfileError> {
    let result =
        sqlx::query("DELETE FROM replication_profiles WHERE provider_actor_id = ? AND dataset_id = ?")
            .bind(&command.provider_actor_id)
            .bind(command.dataset_id)
            .execute(&pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteProfileError::NotFound(
            command.provider_actor_id,
            command.dataset_id,
        ));
    }

    tracing::info!("replication profile deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_dataset, seed_profile, seed_provider, test_pool};

    #[tokio::test]
    async fn test_delete_profile() {
        let pool = test_pool().await;
        let dataset_id = seed_dataset(&pool, "ds", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;
        seed_profile(&pool, "f01000", dataset_id).await;

        let command = DeleteProfileCommand {
            provider_actor_id: "f01000".to_string(),
            dataset_id,
        };
        handle(pool.clone(), command.clone()).await.unwrap();

        // Second delete finds nothing.
        let result = handle(pool, command).await;
        assert!(matches!(result, Err(DeleteProfileError::NotFound(_, _))));
    }
}
