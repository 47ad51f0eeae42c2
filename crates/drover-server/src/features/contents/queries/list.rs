//! List a dataset's content

use sqlx::SqlitePool;

use crate::models::Content;

#[derive(Debug, thiserror::Error)]
pub enum ListContentsError {
    #[error("Dataset with id '{0}' not found")]
    DatasetNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool, dataset_id: i64) -> Result<Vec<Content>, ListContentsError> {
    let dataset_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM datasets WHERE id = ?)")
            .bind(dataset_id)
            .fetch_one(&pool)
            .await?;

    if !dataset_exists {
        return Err(ListContentsError::DatasetNotFound(dataset_id));
    }

    let contents = sqlx::query_as::<_, Content>(
        "SELECT piece_cid, payload_cid, size, padded_size, dataset_id, num_replications,
                content_location
         FROM contents WHERE dataset_id = ? ORDER BY rowid",
    )
    .bind(dataset_id)
    .fetch_all(&pool)
    .await?;

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_content, seed_dataset, test_pool};

    #[tokio::test]
    async fn test_list_scoped_to_dataset() {
        let pool = test_pool().await;
        let ds1 = seed_dataset(&pool, "one", 1, 200).await;
        let ds2 = seed_dataset(&pool, "two", 1, 200).await;
        seed_content(&pool, "piece-a", ds1).await;
        seed_content(&pool, "piece-b", ds2).await;

        let contents = handle(pool, ds1).await.unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].piece_cid, "piece-a");
    }

    #[tokio::test]
    async fn test_unknown_dataset() {
        let pool = test_pool().await;
        assert!(matches!(
            handle(pool, 42).await,
            Err(ListContentsError::DatasetNotFound(42))
        ));
    }
}
