//! List wallets query

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::models::Wallet;

/// Optional dataset filter for wallet listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWalletsQuery {
    pub dataset_id: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListWalletsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: SqlitePool,
    query: ListWalletsQuery,
) -> Result<Vec<Wallet>, ListWalletsError> {
    let wallets = match query.dataset_id {
        Some(dataset_id) => {
            sqlx::query_as::<_, Wallet>(
                "SELECT w.address FROM wallets w
                 INNER JOIN wallet_datasets wd ON wd.wallet_address = w.address
                 WHERE wd.dataset_id = ?
                 ORDER BY wd.rowid",
            )
            .bind(dataset_id)
            .fetch_all(&pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Wallet>("SELECT address FROM wallets ORDER BY address")
                .fetch_all(&pool)
                .await?
        }
    };

    Ok(wallets)
}
