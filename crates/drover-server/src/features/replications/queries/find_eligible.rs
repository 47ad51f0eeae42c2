//! Eligibility query
//!
//! Computes the set of content pieces a provider may still receive. The
//! predicate is kept as one declarative query so the clauses stay auditable
//! as a unit:
//!
//! 1. a replication profile authorizes the provider for the content's dataset
//! 2. the content has quota headroom (`num_replications < replication_quota`)
//! 3. no PENDING or SUCCESS replication already exists for this
//!    content/provider pair (FAILURE rows are transparent: a failed attempt
//!    may be retried)
//! 4. optional restriction to one dataset (`0` means any)
//! 5. optional restriction to content with a download location
//!
//! No match is an empty result, never an error.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::features::replications::types::EligibleContent;
use crate::models::ReplicationStatus;

/// Parameters for the eligibility query.
#[derive(Debug, Clone)]
pub struct FindEligibleQuery {
    pub provider_actor_id: String,
    /// Restrict to one dataset; `None` or `Some(0)` means any dataset.
    pub dataset_id: Option<i64>,
    /// Cap the number of results; `None` returns the full match set.
    pub limit: Option<i64>,
    /// Only content with a non-empty `content_location` (downloadable).
    pub require_location: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum FindEligibleError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handles the eligibility query
#[tracing::instrument(skip(pool, query), fields(provider = %query.provider_actor_id))]
pub async fn handle(
    pool: SqlitePool,
    query: FindEligibleQuery,
) -> Result<Vec<EligibleContent>, FindEligibleError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT c.piece_cid, c.payload_cid, c.size, c.padded_size, c.dataset_id, \
                d.name AS dataset_name, d.deal_duration_days, rp.unsealed, rp.indexed \
         FROM contents c \
         INNER JOIN datasets d ON d.id = c.dataset_id \
         INNER JOIN replication_profiles rp \
                 ON rp.dataset_id = d.id AND rp.provider_actor_id = ",
    );
    qb.push_bind(&query.provider_actor_id);

    qb.push(
        " WHERE c.num_replications < d.replication_quota \
          AND NOT EXISTS ( \
              SELECT 1 FROM replications r \
              WHERE r.piece_cid = c.piece_cid \
                AND r.provider_actor_id = ",
    );
    qb.push_bind(&query.provider_actor_id);
    qb.push(" AND r.status <> ");
    qb.push_bind(ReplicationStatus::Failure);
    qb.push(")");

    match query.dataset_id {
        Some(dataset_id) if dataset_id != 0 => {
            qb.push(" AND d.id = ");
            qb.push_bind(dataset_id);
        }
        _ => {}
    }

    if query.require_location {
        qb.push(" AND c.content_location IS NOT NULL AND c.content_location <> ''");
    }

    qb.push(" ORDER BY c.rowid");

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit);
    }

    let eligible = qb
        .build_query_as::<EligibleContent>()
        .fetch_all(&pool)
        .await?;

    tracing::debug!(count = eligible.len(), "eligibility query finished");

    Ok(eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{
        seed_content, seed_content_with, seed_dataset, seed_profile, seed_provider,
        seed_replication, test_pool,
    };

    fn query(provider: &str) -> FindEligibleQuery {
        FindEligibleQuery {
            provider_actor_id: provider.to_string(),
            dataset_id: None,
            limit: None,
            require_location: false,
        }
    }

    #[tokio::test]
    async fn test_requires_replication_profile() {
        let pool = test_pool().await;
        let ds = seed_dataset(&pool, "ds", 3, 200).await;
        seed_content(&pool, "piece-a", ds).await;
        seed_provider(&pool, "f01000", "key", true).await;

        // No profile: nothing is eligible regardless of quota headroom.
        let eligible = handle(pool.clone(), query("f01000")).await.unwrap();
        assert!(eligible.is_empty());

        seed_profile(&pool, "f01000", ds).await;
        let eligible = handle(pool, query("f01000")).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].piece_cid, "piece-a");
        assert_eq!(eligible[0].dataset_name, "ds");
    }

    #[tokio::test]
    async fn test_quota_exhausted_content_excluded() {
        let pool = test_pool().await;
        let ds = seed_dataset(&pool, "ds", 2, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;
        seed_profile(&pool, "f01000", ds).await;
        seed_content_with(&pool, "piece-full", ds, 2, None).await;
        seed_content_with(&pool, "piece-free", ds, 1, None).await;

        let eligible = handle(pool, query("f01000")).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].piece_cid, "piece-free");
    }

    #[tokio::test]
    async fn test_active_replication_excludes_but_failure_does_not() {
        use crate::models::ReplicationStatus;

        let pool = test_pool().await;
        let ds = seed_dataset(&pool, "ds", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;
        seed_provider(&pool, "f01001", "key2", true).await;
        seed_profile(&pool, "f01000", ds).await;
        seed_content(&pool, "piece-pending", ds).await;
        seed_content(&pool, "piece-success", ds).await;
        seed_content(&pool, "piece-failed", ds).await;
        seed_content(&pool, "piece-other-provider", ds).await;

        seed_replication(&pool, "piece-pending", "f01000", 1, ReplicationStatus::Pending).await;
        seed_replication(&pool, "piece-success", "f01000", 2, ReplicationStatus::Success).await;
        seed_replication(&pool, "piece-failed", "f01000", 3, ReplicationStatus::Failure).await;
        // A replication to a different provider does not block this one.
        seed_replication(
            &pool,
            "piece-other-provider",
            "f01001",
            4,
            ReplicationStatus::Pending,
        )
        .await;

        let eligible = handle(pool, query("f01000")).await.unwrap();
        let pieces: Vec<_> = eligible.iter().map(|c| c.piece_cid.as_str()).collect();
        assert_eq!(pieces, vec!["piece-failed", "piece-other-provider"]);
    }

    #[tokio::test]
    async fn test_dataset_filter_and_zero_means_any() {
        let pool = test_pool().await;
        let ds1 = seed_dataset(&pool, "one", 3, 200).await;
        let ds2 = seed_dataset(&pool, "two", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;
        seed_profile(&pool, "f01000", ds1).await;
        seed_profile(&pool, "f01000", ds2).await;
        seed_content(&pool, "piece-one", ds1).await;
        seed_content(&pool, "piece-two", ds2).await;

        let mut q = query("f01000");
        q.dataset_id = Some(ds2);
        let eligible = handle(pool.clone(), q).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].piece_cid, "piece-two");

        let mut q = query("f01000");
        q.dataset_id = Some(0);
        let eligible = handle(pool, q).await.unwrap();
        assert_eq!(eligible.len(), 2);
    }

    #[tokio::test]
    async fn test_location_filter_and_limit() {
        let pool = test_pool().await;
        let ds = seed_dataset(&pool, "ds", 3, 200).await;
        seed_provider(&pool, "f01000", "key", true).await;
        seed_profile(&pool, "f01000", ds).await;
        seed_content_with(&pool, "piece-a", ds, 0, Some("https://example.com/a.car")).await;
        seed_content_with(&pool, "piece-b", ds, 0, None).await;
        seed_content_with(&pool, "piece-c", ds, 0, Some("")).await;

        let mut q = query("f01000");
        q.require_location = true;
        let eligible = handle(pool.clone(), q).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].piece_cid, "piece-a");

        let mut q = query("f01000");
        q.limit = Some(2);
        let eligible = handle(pool, q).await.unwrap();
        assert_eq!(eligible.len(), 2);
    }
}
