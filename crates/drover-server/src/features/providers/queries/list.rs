//! List providers query

use sqlx::SqlitePool;

use crate::models::Provider;

#[derive(Debug, thiserror::Error)]
pub enum ListProvidersError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool) -> Result<Vec<Provider>, ListProvidersError> {
    let providers = sqlx::query_as::<_, Provider>(
        "SELECT actor_id, display_name, allow_self_service, self_service_key
         FROM providers ORDER BY actor_id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(providers)
}
