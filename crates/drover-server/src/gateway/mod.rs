//! Deal gateway client.
//!
//! The gateway is the external service that actually negotiates and tracks
//! storage deals. It is treated as opaque, possibly slow and possibly flaky:
//! every call carries a bounded timeout, and a failed submission must leave
//! no local state behind (callers only persist rows after a successful
//! response).

pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::GatewayConfig;
pub use types::{DealRequest, DealResult, DealStatus};

/// Errors from deal gateway calls.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned {code}: {body}")]
    Rejected { code: u16, body: String },

    #[error("could not decode gateway response: {reason}: {body}")]
    Decode { reason: String, body: String },

    #[error("auth token must be provided")]
    MissingAuth,
}

/// Batch deal submission and status polling.
#[async_trait]
pub trait DealGateway: Send + Sync {
    /// Submit a batch of deal requests. Returns one result element per
    /// request; element order is not guaranteed to match input order.
    async fn submit_deals(
        &self,
        requests: &[DealRequest],
        auth_key: &str,
    ) -> Result<Vec<DealResult>, GatewayError>;

    /// Fetch current status for previously submitted deals, keyed by the
    /// gateway content ids echoed at submission time.
    async fn deal_statuses(
        &self,
        gateway_content_ids: &[i64],
    ) -> Result<Vec<DealStatus>, GatewayError>;
}

/// HTTP implementation of [`DealGateway`].
pub struct HttpDealGateway {
    base_url: String,
    service_token: String,
    client: Client,
}

impl HttpDealGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            service_token: config.service_token.clone(),
            client,
        })
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        auth_key: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, GatewayError> {
        if auth_key.is_empty() {
            return Err(GatewayError::MissingAuth);
        }

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(auth_key)
            .json(body)
            .send()
            .await?;

        let code = response.status();
        let text = response.text().await?;

        if !code.is_success() {
            return Err(GatewayError::Rejected {
                code: code.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Decode {
            reason: e.to_string(),
            body: text,
        })
    }
}

#[async_trait]
impl DealGateway for HttpDealGateway {
    async fn submit_deals(
        &self,
        requests: &[DealRequest],
        auth_key: &str,
    ) -> Result<Vec<DealResult>, GatewayError> {
        tracing::debug!(count = requests.len(), "submitting deal batch to gateway");
        self.post_json("/api/v1/deal/piece-commitments", auth_key, &requests)
            .await
    }

    async fn deal_statuses(
        &self,
        gateway_content_ids: &[i64],
    ) -> Result<Vec<DealStatus>, GatewayError> {
        self.post_json(
            "/api/v1/stats/contents",
            &self.service_token,
            &gateway_content_ids,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> GatewayConfig {
        GatewayConfig {
            url: url.to_string(),
            service_token: "service-token".to_string(),
            timeout_secs: 5,
            dry_run: false,
        }
    }

    #[test]
    fn test_base_url_is_normalized() {
        let gateway = HttpDealGateway::new(&config("http://localhost:1414/")).unwrap();
        assert_eq!(gateway.base_url, "http://localhost:1414");
    }

    #[tokio::test]
    async fn test_empty_auth_key_rejected_without_network() {
        let gateway = HttpDealGateway::new(&config("http://localhost:1")).unwrap();
        let result = gateway.submit_deals(&[], "").await;
        assert!(matches!(result, Err(GatewayError::MissingAuth)));
    }
}
