//! List datasets query

use sqlx::SqlitePool;

use crate::models::Dataset;

#[derive(Debug, thiserror::Error)]
pub enum ListDatasetsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Return all datasets in creation order.
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool) -> Result<Vec<Dataset>, ListDatasetsError> {
    let datasets = sqlx::query_as::<_, Dataset>(
        "SELECT id, name, replication_quota, deal_duration_days, created_at
         FROM datasets ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(datasets)
}
