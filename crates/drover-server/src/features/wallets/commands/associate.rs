//! Associate wallet command
//!
//! Records that a wallet address may fund deals for a dataset. The wallet row
//! is created on first sight; the association is many-to-many.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::is_unique_violation;

/// Command to associate a wallet with a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociateWalletCommand {
    pub address: String,
    pub dataset_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AssociateWalletError {
    #[error("Wallet address is required")]
    AddressRequired,

    #[error("Dataset with id '{0}' not found")]
    DatasetNotFound(i64),

    #[error("Wallet '{0}' is already associated with dataset {1}")]
    AlreadyAssociated(String, i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the associate wallet command
#[tracing::instrument(skip(pool, command), fields(address = %command.address, dataset_id = command.dataset_id))]
pub async fn handle(
    pool: SqlitePool,
    command: AssociateWalletCommand,
) -> Result<(), AssociateWalletError> {
    if command.address.trim().is_empty() {
        return Err(AssociateWalletError::AddressRequired);
    }

    let dataset_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM datasets WHERE id = ?)")
            .bind(command.dataset_id)
            .fetch_one(&pool)
            .await?;

    if !dataset_exists {
        return Err(AssociateWalletError::DatasetNotFound(command.dataset_id));
    }

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT OR IGNORE INTO wallets (address) VALUES (?)")
        .bind(&command.address)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO wallet_datasets (wallet_address, dataset_id) VALUES (?, ?)")
        .bind(&command.address)
        .bind(command.dataset_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AssociateWalletError::AlreadyAssociated(command.address.clone(), command.dataset_id)
            } else {
                AssociateWalletError::Database(e)
            }
        })?;

    tx.commit().await?;

    tracing::info!("wallet associated with dataset");

    Ok(())
}
