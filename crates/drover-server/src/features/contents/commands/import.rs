//! Bulk content import command
//!
//! Imports a batch of content rows into a dataset. Rows are processed
//! independently: a bad or duplicate row lands in the `fail` list and does
//! not abort the rest of the batch.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// One content row as supplied by the importer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    pub piece_cid: String,
    pub payload_cid: String,
    pub size: i64,
    pub padded_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_location: Option<String>,
}

/// Command to import content into a dataset
#[derive(Debug, Clone)]
pub struct ImportContentsCommand {
    pub dataset_id: i64,
    pub entries: Vec<NewContent>,
}

/// Per-row outcome of a bulk import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResults {
    pub success: Vec<String>,
    pub fail: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportContentsError {
    #[error("Dataset with id '{0}' not found")]
    DatasetNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the bulk import command
#[tracing::instrument(skip(pool, command), fields(dataset_id = command.dataset_id, entries = command.entries.len()))]
pub async fn handle(
    pool: SqlitePool,
    command: ImportContentsCommand,
) -> Result<ImportResults, ImportContentsError> {
    let dataset_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM datasets WHERE id = ?)")
            .bind(command.dataset_id)
            .fetch_one(&pool)
            .await?;

    if !dataset_exists {
        return Err(ImportContentsError::DatasetNotFound(command.dataset_id));
    }

    let mut results = ImportResults::default();

    for entry in command.entries {
        if entry.piece_cid.is_empty()
            || entry.payload_cid.is_empty()
            || entry.size == 0
            || entry.padded_size == 0
        {
            results.fail.push(entry.piece_cid);
            continue;
        }

        let inserted = sqlx::query(
            "INSERT INTO contents
                (piece_cid, payload_cid, size, padded_size, dataset_id, num_replications, content_location)
             VALUES (?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&entry.piece_cid)
        .bind(&entry.payload_cid)
        .bind(entry.size)
        .bind(entry.padded_size)
        .bind(command.dataset_id)
        .bind(&entry.content_location)
        .execute(&pool)
        .await;

        match inserted {
            Ok(_) => results.success.push(entry.piece_cid),
            Err(e) => {
                tracing::warn!(piece_cid = %entry.piece_cid, error = %e, "content row rejected");
                results.fail.push(entry.piece_cid);
            }
        }
    }

    tracing::info!(
        imported = results.success.len(),
        rejected = results.fail.len(),
        "content import finished"
    );

    Ok(results)
}
