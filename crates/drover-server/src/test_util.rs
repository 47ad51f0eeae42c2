//! Test fixtures shared by in-crate unit tests.

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::models::ReplicationStatus;

/// Fresh in-memory database with migrations applied.
///
/// A single connection keeps the in-memory database alive for the whole
/// test.
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

pub async fn seed_content(pool: &SqlitePool, piece_cid: &str, dataset_id: i64) {
    seed_content_with(pool, piece_cid, dataset_id, 0, None).await;
}

pub async fn seed_content_with(
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

pub async fn seed_replication(
    pool: &SqlitePool,
    piece_cid: &str,
    actor_id: &str,
    gateway_content_id: i64,
    status: ReplicationStatus,
) {
    sqlx::query(
        "INSERT INTO replications
            (piece_cid, provider_actor_id, gateway_content_id, proposal_cid, deal_time, status,
             status_message, is_self_service)
         VALUES (?, ?, ?, '', ?, ?, '', 0)",
    )
    .bind(piece_cid)
    .bind(actor_id)
    .bind(gateway_content_id)
    .bind(Utc::now())
    .bind(status)
    .execute(pool)
    .await
    .expect("seed replication");
}

pub async fn num_replications(pool: &SqlitePool, piece_cid: &str) -> i64 {
    sqlx::query_scalar("SELECT num_replications FROM contents WHERE piece_cid = ?")
        .bind(piece_cid)
        .fetch_one(pool)
        .await
        .expect("content row")
}
