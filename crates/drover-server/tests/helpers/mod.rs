//! Shared fixtures for integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use drover_server::gateway::types::{
    DealProposal, DealStatus, DealStatusContent, OnChainDeal, CONTENT_DEAL_PROPOSAL_FAILED,
    CONTENT_DEAL_PROPOSAL_SENT,
};
use drover_server::gateway::{DealGateway, DealRequest, DealResult, GatewayError};
use drover_server::models::ReplicationStatus;

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("apply migrations");

    pool
}

pub async fn seed_dataset(pool: &SqlitePool, name: &str, quota: i64, duration_days: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO datasets (name, replication_quota, deal_duration_days, created_at)
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(quota)
    .bind(duration_days)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("seed dataset")
}

pub async fn seed_content(
    pool: &SqlitePool,
    piece_cid: &str,
    dataset_id: i64,
    num_replications: i64,
    content_location: Option<&str>,
) {
    sqlx::query(
        "INSERT INTO contents
            (piece_cid, payload_cid, size, padded_size, dataset_id, num_replications, content_location)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(piece_cid)
    .bind(format!("payload-{}", piece_cid))
    .bind(1024_i64)
    .bind(2048_i64)
    .bind(dataset_id)
    .bind(num_replications)
    .bind(content_location)
    .execute(pool)
    .await
    .expect("seed content");
}

pub async fn seed_provider(pool: &SqlitePool, actor_id: &str, key: &str, allow_self_service: bool) {
    sqlx::query(
        "INSERT INTO providers (actor_id, display_name, allow_self_service, self_service_key)
         VALUES (?, ?, ?, ?)",
    )
    .bind(actor_id)
    .bind(format!("provider {}", actor_id))
    .bind(allow_self_service)
    .bind(key)
    .execute(pool)
    .await
    .expect("seed provider");
}

pub async fn seed_profile(pool: &SqlitePool, actor_id: &str, dataset_id: i64) {
    sqlx::query(
        "INSERT INTO replication_profiles (provider_actor_id, dataset_id, unsealed, indexed)
         VALUES (?, ?, 0, 1)",
    )
    .bind(actor_id)
    .bind(dataset_id)
    .execute(pool)
    .await
    .expect("seed replication profile");
}

pub async fn seed_wallet(pool: &SqlitePool, address: &str, dataset_id: i64) {
    sqlx::query("INSERT OR IGNORE INTO wallets (address) VALUES (?)")
        .bind(address)
        .execute(pool)
        .await
        .expect("seed wallet");
    sqlx::query("INSERT INTO wallet_datasets (wallet_address, dataset_id) VALUES (?, ?)")
        .bind(address)
        .bind(dataset_id)
        .execute(pool)
        .await
        .expect("seed wallet association");
}

pub async fn num_replications(pool: &SqlitePool, piece_cid: &str) -> i64 {
    sqlx::query_scalar("SELECT num_replications FROM contents WHERE piece_cid = ?")
        .bind(piece_cid)
        .fetch_one(pool)
        .await
        .expect("content row")
}

pub async fn replication_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM replications")
        .fetch_one(pool)
        .await
        .expect("count replications")
}

pub async fn replication_status(pool: &SqlitePool, gateway_content_id: i64) -> ReplicationStatus {
    sqlx::query_scalar("SELECT status FROM replications WHERE gateway_content_id = ?")
        .bind(gateway_content_id)
        .fetch_one(pool)
        .await
        .expect("replication row")
}

/// Scripted in-memory deal gateway.
///
/// Accepts every submitted request unless the piece cid is marked for
/// rejection, assigning sequential gateway content ids. Status responses are
/// scripted via [`MockGateway::report_success`] / [`MockGateway::report_failure`]
/// and returned wholesale, mirroring a gateway that may report on deals it
/// was not asked about.
pub struct MockGateway {
    next_id: AtomicI64,
    reject_pieces: Mutex<HashSet<String>>,
    statuses: Mutex<HashMap<i64, DealStatus>>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    fail_transport: AtomicBool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            reject_pieces: Mutex::new(HashSet::new()),
            statuses: Mutex::new(HashMap::new()),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fail_transport: AtomicBool::new(false),
        }
    }

    /// Reject submissions for this piece with a non-success element.
    pub fn reject_piece(&self, piece_cid: &str) {
        self.reject_pieces
            .lock()
            .unwrap()
            .insert(piece_cid.to_string());
    }

    /// Fail every call with a transport-level error.
    pub fn fail_transport(&self) {
        self.fail_transport.store(true, Ordering::SeqCst);
    }

    /// Script a successful terminal status for a submitted deal.
    pub fn report_success(&self, gateway_content_id: i64, proposal_cid: &str) {
        self.statuses.lock().unwrap().insert(
            gateway_content_id,
            DealStatus {
                content: DealStatusContent {
                    id: gateway_content_id,
                    status: CONTENT_DEAL_PROPOSAL_SENT.to_string(),
                    last_message: "deal proposal sent".to_string(),
                },
                deal_proposals: vec![DealProposal {
                    signed: proposal_cid.to_string(),
                }],
                deals: vec![OnChainDeal {
                    proposal_cid: proposal_cid.to_string(),
                    deal_uuid: format!("uuid-{}", gateway_content_id),
                    deal_id: 1000 + gateway_content_id,
                }],
                piece_commitments: vec![],
            },
        );
    }

    /// Script a failed terminal status for a submitted deal.
    pub fn report_failure(&self, gateway_content_id: i64, message: &str) {
        self.statuses.lock().unwrap().insert(
            gateway_content_id,
            DealStatus {
                content: DealStatusContent {
                    id: gateway_content_id,
                    status: CONTENT_DEAL_PROPOSAL_FAILED.to_string(),
                    last_message: message.to_string(),
                },
                deal_proposals: vec![],
                deals: vec![],
                piece_commitments: vec![],
            },
        );
    }
}

#[async_trait]
impl DealGateway for MockGateway {
    async fn submit_deals(
        &self,
        requests: &[DealRequest],
        _auth_key: &str,
    ) -> Result<Vec<DealResult>, GatewayError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                code: 502,
                body: "gateway unavailable".to_string(),
            });
        }

        let rejected = self.reject_pieces.lock().unwrap();
        let results = requests
            .iter()
            .map(|request| {
                if rejected.contains(&request.piece_commitment.piece_cid) {
                    DealResult {
                        status: "error".to_string(),
                        message: "piece rejected".to_string(),
                        content_id: 0,
                        piece_commitment_id: 0,
                        request_meta: request.clone(),
                    }
                } else {
                    DealResult {
                        status: "success".to_string(),
                        message: String::new(),
                        content_id: self.next_id.fetch_add(1, Ordering::SeqCst),
                        piece_commitment_id: 0,
                        request_meta: request.clone(),
                    }
                }
            })
            .collect();

        Ok(results)
    }

    async fn deal_statuses(
        &self,
        _gateway_content_ids: &[i64],
    ) -> Result<Vec<DealStatus>, GatewayError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                code: 502,
                body: "gateway unavailable".to_string(),
            });
        }

        Ok(self.statuses.lock().unwrap().values().cloned().collect())
    }
}
