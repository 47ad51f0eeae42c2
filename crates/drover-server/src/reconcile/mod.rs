//! Replication reconciliation
//!
//! Background loop that converges local replication state with the deal
//! gateway. Each tick polls the gateway for every PENDING replication and
//! applies the resulting transitions; a transition into FAILURE returns the
//! content's quota capacity so the piece becomes eligible again.
//!
//! Ticks are idempotent: terminal rows are excluded from the pending query
//! and the update statement refuses to touch rows that already left PENDING,
//! so re-deriving the same update is a no-op. Tick failures are logged and
//! the loop keeps running; the next tick retries from scratch. Exactly one
//! loop instance must run per deployment, otherwise a failed deal could be
//! rolled back twice.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::gateway::types::{derive_update, ReplicationUpdate};
use crate::gateway::{DealGateway, GatewayError};
use crate::models::ReplicationStatus;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("could not get deal status: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Counters from one reconciliation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// PENDING replications found at the start of the tick.
    pub pending: usize,
    /// Rows moved into a terminal state.
    pub updated: usize,
    /// Subset of `updated` that became FAILURE (and rolled back quota).
    pub failed: usize,
}

/// The background reconciliation loop.
pub struct ReconcileLoop {
    db: SqlitePool,
    gateway: Arc<dyn DealGateway>,
    interval: Duration,
}

impl ReconcileLoop {
    pub fn new(db: SqlitePool, gateway: Arc<dyn DealGateway>, interval: Duration) -> Self {
        Self {
            db,
            gateway,
            interval,
        }
    }

    /// Start the loop in a background task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "reconciliation loop started"
            );

            loop {
                sleep(self.interval).await;

                match run_reconciliation(&self.db, self.gateway.as_ref()).await {
                    Ok(stats) if stats.updated > 0 => {
                        info!(
                            pending = stats.pending,
                            updated = stats.updated,
                            failed = stats.failed,
                            "reconciliation tick applied updates"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "reconciliation tick failed");
                    }
                }
            }
        })
    }
}

/// Run one reconciliation tick.
#[tracing::instrument(skip(pool, gateway))]
pub async fn run_reconciliation(
    pool: &SqlitePool,
    gateway: &dyn DealGateway,
) -> Result<ReconcileStats, ReconcileError> {
    debug!("starting reconcile tick");

    let pending_ids: Vec<i64> =
        sqlx::query_scalar("SELECT gateway_content_id FROM replications WHERE status = ?")
            .bind(ReplicationStatus::Pending)
            .fetch_all(pool)
            .await?;

    if pending_ids.is_empty() {
        debug!("no pending replications");
        return Ok(ReconcileStats::default());
    }

    debug!(count = pending_ids.len(), "polling gateway for deal status");
    let statuses = gateway.deal_statuses(&pending_ids).await?;

    let updates: Vec<ReplicationUpdate> = statuses.iter().filter_map(derive_update).collect();

    let mut stats = ReconcileStats {
        pending: pending_ids.len(),
        ..Default::default()
    };

    for update in updates {
        match apply_update(pool, &update).await {
            Ok(true) => {
                stats.updated += 1;
                if update.status == ReplicationStatus::Failure {
                    stats.failed += 1;
                }
            }
            Ok(false) => {
                // Row already terminal; nothing to do.
            }
            Err(e) => {
                error!(
                    gateway_content_id = update.gateway_content_id,
                    error = %e,
                    "could not update replication"
                );
            }
        }
    }

    Ok(stats)
}

/// Apply one derived update. Returns whether a row actually transitioned.
///
/// The `status = PENDING` guard makes terminal states immutable even if the
/// gateway keeps reporting on old deals, and the rollback shares the
/// transaction with the status write so quota capacity cannot be returned
/// twice.
async fn apply_update(
    pool: &SqlitePool,
    update: &ReplicationUpdate,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE replications
         SET status = ?,
             status_message = ?,
             proposal_cid = COALESCE(?, proposal_cid),
             deal_uuid = COALESCE(?, deal_uuid),
             on_chain_deal_id = COALESCE(?, on_chain_deal_id)
         WHERE gateway_content_id = ? AND status = ?",
    )
    .bind(update.status)
    .bind(&update.message)
    .bind(&update.proposal_cid)
    .bind(&update.deal_uuid)
    .bind(update.on_chain_deal_id)
    .bind(update.gateway_content_id)
    .bind(ReplicationStatus::Pending)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    if update.status == ReplicationStatus::Failure {
        // Return quota capacity so the piece can be re-attempted.
        sqlx::query(
            "UPDATE contents
             SET num_replications = MAX(num_replications - 1, 0)
             WHERE piece_cid = (SELECT piece_cid FROM replications WHERE gateway_content_id = ?)",
        )
        .bind(update.gateway_content_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::{DealStatus, DealStatusContent, CONTENT_DEAL_PROPOSAL_FAILED};
    use crate::test_util::{
        seed_content_with, seed_dataset, seed_provider, seed_replication, test_pool,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Gateway stub that returns a fixed status response and records calls.
    struct StubGateway {
        statuses: Vec<DealStatus>,
        status_calls: Mutex<Vec<Vec<i64>>>,
    }

    impl StubGateway {
        fn new(statuses: Vec<DealStatus>) -> Self {
            Self {
                statuses,
                status_calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DealGateway for StubGateway {
        async fn submit_deals(
            &self,
            _requests: &[crate::gateway::DealRequest],
            _auth_key: &str,
        ) -> Result<Vec<crate::gateway::DealResult>, GatewayError> {
            unimplemented!("not used by reconciliation tests")
        }

        async fn deal_statuses(
            &self,
            gateway_content_ids: &[i64],
        ) -> Result<Vec<DealStatus>, GatewayError> {
            self.status_calls
                .lock()
                .unwrap()
                .push(gateway_content_ids.to_vec());
            Ok(self.statuses.clone())
        }
    }

    fn failed_status(id: i64) -> DealStatus {
        DealStatus {
            content: DealStatusContent {
                id,
                status: CONTENT_DEAL_PROPOSAL_FAILED.to_string(),
                last_message: "proposal rejected".to_string(),
            },
            deal_proposals: vec![],
            deals: vec![],
            piece_commitments: vec![],
        }
    }

    #[tokio::test]
    async fn test_no_pending_rows_skips_gateway() {
        let pool = test_pool().await;
        let gateway = StubGateway::new(vec![]);

        let stats = run_reconciliation(&pool, &gateway).await.unwrap();
        assert_eq!(stats, ReconcileStats::default());
        assert!(gateway.status_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_rolls_back_quota_once() {
        let pool = test_pool().await;
        let ds = seed_dataset(&pool, "ds", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;
        seed_content_with(&pool, "piece-a", ds, 1, None).await;
        seed_replication(&pool, "piece-a", "f01000", 7, ReplicationStatus::Pending).await;

        let gateway = StubGateway::new(vec![failed_status(7)]);

        let stats = run_reconciliation(&pool, &gateway).await.unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.failed, 1);

        let n = crate::test_util::num_replications(&pool, "piece-a").await;
        assert_eq!(n, 0);

        // Terminal rows are excluded from the next tick; no second rollback.
        let stats = run_reconciliation(&pool, &gateway).await.unwrap();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.updated, 0);
        assert_eq!(crate::test_util::num_replications(&pool, "piece-a").await, 0);
    }

    #[tokio::test]
    async fn test_rollback_floors_at_zero() {
        let pool = test_pool().await;
        let ds = seed_dataset(&pool, "ds", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;
        seed_content_with(&pool, "piece-a", ds, 0, None).await;
        seed_replication(&pool, "piece-a", "f01000", 7, ReplicationStatus::Pending).await;

        let gateway = StubGateway::new(vec![failed_status(7)]);
        run_reconciliation(&pool, &gateway).await.unwrap();

        assert_eq!(crate::test_util::num_replications(&pool, "piece-a").await, 0);
    }
}
