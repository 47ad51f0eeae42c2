//! List replication profiles query

use sqlx::SqlitePool;

use crate::models::ReplicationProfile;

#[derive(Debug, thiserror::Error)]
pub enum ListProfilesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool) -> Result<Vec<ReplicationProfile>, ListProfilesError> {
    let profiles = sqlx::query_as::<_, ReplicationProfile>(
        "SELECT provider_actor_id, dataset_id, unsealed, indexed
         FROM replication_profiles ORDER BY provider_actor_id, dataset_id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(profiles)
}
