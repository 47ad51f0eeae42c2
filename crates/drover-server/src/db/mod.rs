//! Database pool construction and shared database error helpers.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}")]
    Config(String),

    /// Migration failure
    #[error("Database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Create the SQLite connection pool.
///
/// The database file is created if missing; WAL journaling keeps the
/// reconciliation loop and request handlers from blocking each other.
pub async fn create_pool(config: &DatabaseConfig) -> DbResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DbError::Config(format!("invalid DATABASE_URL '{}': {}", config.url, e)))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Whether an error is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE constraint failed")
    )
}
