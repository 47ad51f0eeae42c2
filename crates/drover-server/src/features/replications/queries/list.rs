//! Replication listing
//!
//! Filterable, paginated view over replication rows. A piece cid or proposal
//! cid filter is a point lookup and short-circuits the other filters.

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{Replication, ReplicationStatus};

/// Query parameters for the replication listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReplicationsQuery {
    /// Comma-separated provider actor ids.
    pub providers: Option<String>,
    /// Comma-separated dataset names.
    pub datasets: Option<String>,
    /// Comma-separated statuses (PENDING, SUCCESS, FAILURE).
    pub statuses: Option<String>,
    pub self_service: Option<bool>,
    pub piece_cid: Option<String>,
    pub proposal_cid: Option<String>,
    /// Substring match against the gateway status message.
    pub message: Option<String>,
    /// Epoch seconds, inclusive.
    pub deal_time_start: Option<i64>,
    /// Epoch seconds, inclusive.
    pub deal_time_end: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of replications plus the unpaginated match count.
#[derive(Debug, Clone, Serialize)]
pub struct ReplicationPage {
    pub data: Vec<Replication>,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum ListReplicationsError {
    #[error("invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const DEFAULT_LIMIT: i64 = 100;

/// Handles the replication listing query
#[tracing::instrument(skip(pool, query))]
pub async fn handle(
    pool: SqlitePool,
    query: ListReplicationsQuery,
) -> Result<ReplicationPage, ListReplicationsError> {
    let statuses = parse_statuses(query.statuses.as_deref())?;

    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT COUNT(*) FROM replications r \
         INNER JOIN contents c ON c.piece_cid = r.piece_cid \
         INNER JOIN datasets d ON d.id = c.dataset_id WHERE 1 = 1",
    );
    push_filters(&mut count_qb, &query, &statuses);
    let total_count: i64 = count_qb.build_query_scalar().fetch_one(&pool).await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT r.id, r.piece_cid, r.provider_actor_id, r.gateway_content_id, r.proposal_cid, \
                r.deal_uuid, r.on_chain_deal_id, r.deal_time, r.status, r.status_message, \
                r.is_self_service \
         FROM replications r \
         INNER JOIN contents c ON c.piece_cid = r.piece_cid \
         INNER JOIN datasets d ON d.id = c.dataset_id WHERE 1 = 1",
    );
    push_filters(&mut qb, &query, &statuses);

    qb.push(" ORDER BY r.id DESC LIMIT ");
    qb.push_bind(query.limit.unwrap_or(DEFAULT_LIMIT));
    qb.push(" OFFSET ");
    qb.push_bind(query.offset.unwrap_or(0));

    let data = qb.build_query_as::<Replication>().fetch_all(&pool).await?;

    Ok(ReplicationPage { data, total_count })
}

fn parse_statuses(
    raw: Option<&str>,
) -> Result<Vec<ReplicationStatus>, ListReplicationsError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<ReplicationStatus>()
                .map_err(ListReplicationsError::InvalidStatus)
        })
        .collect()
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Sqlite>,
    query: &ListReplicationsQuery,
    statuses: &[ReplicationStatus],
) {
    // Point lookups win over every other filter.
    if let Some(ref piece_cid) = query.piece_cid {
        qb.push(" AND r.piece_cid = ");
        qb.push_bind(piece_cid.clone());
        return;
    }
    if let Some(ref proposal_cid) = query.proposal_cid {
        qb.push(" AND r.proposal_cid = ");
        qb.push_bind(proposal_cid.clone());
        return;
    }

    if !statuses.is_empty() {
        qb.push(" AND r.status IN (");
        let mut separated = qb.separated(", ");
        for status in statuses {
            separated.push_bind(*status);
        }
        qb.push(")");
    }

    if let Some(ref providers) = query.providers {
        qb.push(" AND r.provider_actor_id IN (");
        let mut separated = qb.separated(", ");
        for provider in providers.split(',').filter(|s| !s.trim().is_empty()) {
            separated.push_bind(provider.trim().to_string());
        }
        qb.push(")");
    }

    if let Some(ref datasets) = query.datasets {
        qb.push(" AND d.name IN (");
        let mut separated = qb.separated(", ");
        for dataset in datasets.split(',').filter(|s| !s.trim().is_empty()) {
            separated.push_bind(dataset.trim().to_string());
        }
        qb.push(")");
    }

    if let Some(self_service) = query.self_service {
        qb.push(" AND r.is_self_service = ");
        qb.push_bind(self_service);
    }

    if let Some(ref message) = query.message {
        qb.push(" AND r.status_message LIKE ");
        qb.push_bind(format!("%{}%", message));
    }

    if let Some(start) = query.deal_time_start {
        qb.push(" AND datetime(r.deal_time) >= datetime(");
        qb.push_bind(start);
        qb.push(", 'unixepoch')");
    }

    if let Some(end) = query.deal_time_end {
        qb.push(" AND datetime(r.deal_time) <= datetime(");
        qb.push_bind(end);
        qb.push(", 'unixepoch')");
    }
}
