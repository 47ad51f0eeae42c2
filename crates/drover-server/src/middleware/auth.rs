//! Operator authentication middleware.
//!
//! Operator endpoints require an `Authorization: Bearer <key>` header. The
//! key itself is opaque to drover: it is forwarded to the deal gateway as the
//! submission credential, and the gateway is the authority that accepts or
//! rejects it. Self-service endpoints use a different, per-provider token in
//! the [`PROVIDER_AUTH_HEADER`] header and bypass this middleware.

use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Header carrying a provider's self-service capability token.
pub const PROVIDER_AUTH_HEADER: &str = "X-Drover-Auth";

/// Bearer key extracted from the Authorization header, stored as a request
/// extension for handlers that forward it to the deal gateway.
#[derive(Debug, Clone)]
pub struct AuthKey(pub String);

/// Require a well-formed bearer token on the request.
pub async fn require_bearer(mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match extract_auth_key(header) {
        Ok(key) => {
            request.extensions_mut().insert(AuthKey(key));
            next.run(request).await
        }
        Err(message) => AppError::Unauthorized(message).into_response(),
    }
}

/// Check that an auth string is populated and formatted correctly, then
/// return the bare key.
fn extract_auth_key(authorization: Option<&str>) -> Result<String, String> {
    let value = match authorization {
        Some(v) if !v.is_empty() => v,
        _ => return Err("missing auth header".to_string()),
    };

    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let key = parts.next().unwrap_or_default();

    if scheme != "Bearer" || key.is_empty() {
        return Err("malformed auth header - must be of the form `Bearer <key>`".to_string());
    }

    Ok(key.to_string())
}
