use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use crate::middleware::AuthKey;

use super::commands::{request, RequestReplicationsCommand, RequestReplicationsError};
use super::queries::{list, ListReplicationsError, ListReplicationsQuery};

pub fn replications_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_replications))
        .route("/", post(post_replications))
}

#[tracing::instrument(skip(state, query))]
async fn list_replications(
    State(state): State<FeatureState>,
    Query(query): Query<ListReplicationsQuery>,
) -> Result<Response, ReplicationApiError> {
    let page = list::handle(state.db, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(page))).into_response())
}

#[tracing::instrument(skip(state, auth, command), fields(provider = %command.provider))]
async fn post_replications(
    State(state): State<FeatureState>,
    Extension(auth): Extension<AuthKey>,
    Json(command): Json<RequestReplicationsCommand>,
) -> Result<Response, ReplicationApiError> {
    let outcome = request::handle(
        state.db.clone(),
        state.gateway.as_ref(),
        &auth.0,
        state.dry_run,
        command,
    )
    .await?;

    tracing::info!(
        recorded = outcome.replications_created,
        "replication request finished"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(outcome))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum ReplicationApiError {
    #[error(transparent)]
    Request(#[from] RequestReplicationsError),
    #[error(transparent)]
    List(#[from] ListReplicationsError),
}

impl IntoResponse for ReplicationApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ReplicationApiError::Request(RequestReplicationsError::ProviderNotFound(_))
            | ReplicationApiError::Request(RequestReplicationsError::DatasetNotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ReplicationApiError::Request(RequestReplicationsError::InvalidNumDeals)
            | ReplicationApiError::Request(RequestReplicationsError::Params(_))
            | ReplicationApiError::List(ListReplicationsError::InvalidStatus(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ReplicationApiError::Request(RequestReplicationsError::NoEligibleContent(_)) => {
                (StatusCode::BAD_REQUEST, "NO_ELIGIBLE_CONTENT")
            }
            ReplicationApiError::Request(RequestReplicationsError::NoWallet(_)) => {
                (StatusCode::BAD_REQUEST, "NO_WALLET")
            }
            ReplicationApiError::Request(RequestReplicationsError::Gateway(e)) => {
                tracing::error!("deal gateway error: {}", e);
                (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR")
            }
            ReplicationApiError::Request(RequestReplicationsError::Database(_))
            | ReplicationApiError::List(ListReplicationsError::Database(_)) => {
                tracing::error!("replication endpoint database error: {}", self);
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
