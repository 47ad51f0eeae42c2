//! Wallet selection
//!
//! Picks the funding wallet for a dataset: the first wallet in association
//! order. Selection is not balance-aware. A dataset with no wallet means no
//! deals can be made for it, and callers must abort the whole submission
//! rather than partially submit.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::features::replications::types::{DealCandidate, EligibleContent};
use crate::models::Wallet;

#[derive(Debug, thiserror::Error)]
pub enum SelectWalletError {
    #[error("no wallet found for dataset '{0}'")]
    NoWallet(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles wallet selection for a dataset
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: SqlitePool, dataset_id: i64) -> Result<Wallet, SelectWalletError> {
    let wallet = sqlx::query_as::<_, Wallet>(
        "SELECT w.address FROM wallets w
         INNER JOIN wallet_datasets wd ON wd.wallet_address = w.address
         WHERE wd.dataset_id = ?
         ORDER BY wd.rowid
         LIMIT 1",
    )
    .bind(dataset_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(SelectWalletError::NoWallet(dataset_id))?;

    Ok(wallet)
}

/// Pair every eligible piece with its dataset's funding wallet.
///
/// Fails before any deal is submitted if any involved dataset lacks a wallet.
pub async fn resolve_wallets(
    pool: SqlitePool,
    candidates: Vec<EligibleContent>,
) -> Result<Vec<DealCandidate>, SelectWalletError> {
    let mut by_dataset: HashMap<i64, String> = HashMap::new();
    let mut resolved = Vec::with_capacity(candidates.len());

    for content in candidates {
        let address = match by_dataset.get(&content.dataset_id) {
            Some(address) => address.clone(),
            None => {
                let wallet = handle(pool.clone(), content.dataset_id).await?;
                by_dataset.insert(content.dataset_id, wallet.address.clone());
                wallet.address
            }
        };

        resolved.push(DealCandidate {
            content,
            wallet_address: address,
        });
    }

    Ok(resolved)
}
