//! Create dataset command
//!
//! Registers a new dataset and its replication policy. Content is attached
//! separately via bulk import.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::is_unique_violation;
use crate::features::shared::validation::{validate_slug, SlugValidationError};
use crate::models::Dataset;

/// Deal durations are bounded to the range the downstream network accepts.
pub const MIN_DEAL_DURATION_DAYS: i64 = 180;
pub const MAX_DEAL_DURATION_DAYS: i64 = 540;

/// Command to create a new dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatasetCommand {
    pub name: String,
    pub replication_quota: i64,
    pub deal_duration_days: i64,
}

/// Errors that can occur when creating a dataset
#[derive(Debug, thiserror::Error)]
pub enum CreateDatasetError {
    #[error("Dataset name validation failed: {0}")]
    NameValidation(#[from] SlugValidationError),

    #[error("Replication quota must be at least 1")]
    InvalidQuota,

    #[error("Deal duration must be between {MIN_DEAL_DURATION_DAYS} and {MAX_DEAL_DURATION_DAYS} days")]
    InvalidDuration,

    #[error("Dataset with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CreateDatasetCommand {
    /// Validates the command parameters
    pub fn validate(&self) -> Result<(), CreateDatasetError> {
        validate_slug(&self.name, 64)?;

        if self.replication_quota < 1 {
            return Err(CreateDatasetError::InvalidQuota);
        }

        if self.deal_duration_days < MIN_DEAL_DURATION_DAYS
            || self.deal_duration_days > MAX_DEAL_DURATION_DAYS
        {
            return Err(CreateDatasetError::InvalidDuration);
        }

        Ok(())
    }
}

/// Handles the create dataset command
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    command: CreateDatasetCommand,
) -> Result<Dataset, CreateDatasetError> {
    command.validate()?;

    let dataset = sqlx::query_as::<_, Dataset>(
        "INSERT INTO datasets (name, replication_quota, deal_duration_days, created_at)
         VALUES (?, ?, ?, ?)
         RETURNING id, name, replication_quota, deal_duration_days, created_at",
    )
    .bind(&command.name)
    .bind(command.replication_quota)
    .bind(command.deal_duration_days)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            CreateDatasetError::DuplicateName(command.name.clone())
        } else {
            CreateDatasetError::Database(e)
        }
    })?;

    tracing::info!(dataset_id = dataset.id, name = %dataset.name, "dataset created");

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_pool;

    fn command(name: &str) -> CreateDatasetCommand {
        CreateDatasetCommand {
            name: name.to_string(),
            replication_quota: 3,
            deal_duration_days: 540,
        }
    }

    #[test]
    fn test_validation_bounds() {
        assert!(command("common-crawl").validate().is_ok());

        let mut cmd = command("common-crawl");
        cmd.replication_quota = 0;
        assert!(matches!(cmd.validate(), Err(CreateDatasetError::InvalidQuota)));

        let mut cmd = command("common-crawl");
        cmd.deal_duration_days = 179;
        assert!(matches!(cmd.validate(), Err(CreateDatasetError::InvalidDuration)));

        let mut cmd = command("common-crawl");
        cmd.deal_duration_days = 541;
        assert!(matches!(cmd.validate(), Err(CreateDatasetError::InvalidDuration)));

        assert!(matches!(
            command("Bad Name").validate(),
            Err(CreateDatasetError::NameValidation(_))
        ));
    }

    #[tokio::test]
    async fn test_handle_creates_dataset() {
        let pool = test_pool().await;

        let dataset = handle(pool.clone(), command("common-crawl")).await.unwrap();
        assert_eq!(dataset.name, "common-crawl");
        assert_eq!(dataset.replication_quota, 3);
        assert!(dataset.id > 0);
    }

    #[tokio::test]
    async fn test_handle_duplicate_name() {
        let pool = test_pool().await;

        handle(pool.clone(), command("common-crawl")).await.unwrap();
        let result = handle(pool.clone(), command("common-crawl")).await;
        assert!(matches!(result, Err(CreateDatasetError::DuplicateName(_))));
    }
}
