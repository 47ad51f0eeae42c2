use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::replications::types::DealParams;
use crate::features::FeatureState;
use crate::middleware::PROVIDER_AUTH_HEADER;

use super::commands::{by_dataset, by_piece, SelfServiceError};

pub fn self_service_routes() -> Router<FeatureState> {
    Router::new()
        .route("/by-piece/:piece", get(self_service_by_piece))
        .route("/by-dataset/:dataset_id", get(self_service_by_dataset))
}

/// Deal timing knobs accepted on self-service requests.
#[derive(Debug, Clone, Default, Deserialize)]
struct SelfServiceParams {
    delay_days: Option<i64>,
    advance_days: Option<i64>,
}

fn provider_token(headers: &HeaderMap) -> String {
    headers
        .get(PROVIDER_AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tracing::instrument(skip(state, headers, params), fields(piece_cid = %piece))]
async fn self_service_by_piece(
    State(state): State<FeatureState>,
    Path(piece): Path<String>,
    Query(params): Query<SelfServiceParams>,
    headers: HeaderMap,
) -> Result<Response, SelfServiceError> {
    let deal_params = DealParams::new(params.delay_days, params.advance_days)?;
    let token = provider_token(&headers);

    let outcome = by_piece::handle(
        state.db.clone(),
        state.gateway.as_ref(),
        &state.service_token,
        state.dry_run,
        &token,
        &piece,
        deal_params,
    )
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(outcome))).into_response())
}

#[tracing::instrument(skip(state, headers, params), fields(dataset_id = dataset_id))]
async fn self_service_by_dataset(
    State(state): State<FeatureState>,
    Path(dataset_id): Path<i64>,
    Query(params): Query<SelfServiceParams>,
    headers: HeaderMap,
) -> Result<Response, SelfServiceError> {
    let deal_params = DealParams::new(params.delay_days, params.advance_days)?;
    let token = provider_token(&headers);

    let outcome = by_dataset::handle(
        state.db.clone(),
        state.gateway.as_ref(),
        &state.service_token,
        state.dry_run,
        &token,
        dataset_id,
        deal_params,
    )
    .await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(outcome))).into_response())
}

impl IntoResponse for SelfServiceError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            SelfServiceError::InvalidToken | SelfServiceError::SelfServiceDisabled(_) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            SelfServiceError::NotAuthorized(_, _) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            SelfServiceError::UnknownPiece(_) | SelfServiceError::DatasetNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            SelfServiceError::QuotaReached(_, _) | SelfServiceError::AlreadyReplicated(_, _) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            SelfServiceError::NoEligibleContent => (StatusCode::BAD_REQUEST, "NO_ELIGIBLE_CONTENT"),
            SelfServiceError::NoWallet(_) => (StatusCode::BAD_REQUEST, "NO_WALLET"),
            SelfServiceError::Params(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            SelfServiceError::Gateway(e) => {
                tracing::error!("deal gateway error: {}", e);
                (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR")
            }
            SelfServiceError::Database(_) => {
                tracing::error!("self-service endpoint database error: {}", self);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")),
                )
                    .into_response();
            }
        };

        (status, Json(ErrorResponse::new(code, self.to_string()))).into_response()
    }
}
