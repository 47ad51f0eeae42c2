//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 1314;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://drover.db";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default per-request timeout for deal gateway calls in seconds.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 60;

/// Default interval between reconciliation ticks in seconds.
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 10;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub reconcile: ReconcileConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

/// Deal gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the deal gateway service.
    pub url: String,
    /// Service-level auth token, used for status polling and self-service
    /// submissions.
    pub service_token: String,
    /// Per-request timeout. A timed-out submission writes no rows.
    pub timeout_secs: u64,
    /// When set, submissions never reach the gateway and replications are
    /// recorded as immediately successful.
    pub dry_run: bool,
}

/// Reconciliation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("DROVER_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("DROVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("DROVER_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            },
            gateway: GatewayConfig {
                url: std::env::var("DEAL_GATEWAY_URL").unwrap_or_default(),
                service_token: std::env::var("DEAL_GATEWAY_TOKEN").unwrap_or_default(),
                timeout_secs: std::env::var("DEAL_GATEWAY_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS),
                dry_run: std::env::var("DROVER_DRY_RUN")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
            },
            reconcile: ReconcileConfig {
                enabled: std::env::var("RECONCILE_ENABLED")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
                interval_secs: std::env::var("RECONCILE_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RECONCILE_INTERVAL_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        // A live deployment needs a reachable gateway; dry-run mode does not.
        if !self.gateway.dry_run && self.gateway.url.is_empty() {
            anyhow::bail!("DEAL_GATEWAY_URL must be set unless DROVER_DRY_RUN=true");
        }

        if self.reconcile.interval_secs == 0 {
            anyhow::bail!("Reconcile interval must be at least 1 second");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            },
            gateway: GatewayConfig {
                url: String::new(),
                service_token: String::new(),
                timeout_secs: DEFAULT_GATEWAY_TIMEOUT_SECS,
                dry_run: false,
            },
            reconcile: ReconcileConfig {
                enabled: true,
                interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
            },
        }
    }
}
