use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::commands::{associate, AssociateWalletCommand, AssociateWalletError};
use super::queries::{list, ListWalletsError, ListWalletsQuery};

pub fn wallets_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", post(associate_wallet))
        .route("/", get(list_wallets))
}

#[tracing::instrument(skip(pool, command), fields(address = %command.address, dataset_id = command.dataset_id))]
async fn associate_wallet(
    State(pool): State<SqlitePool>,
    Json(command): Json<AssociateWalletCommand>,
) -> Result<Response, WalletApiError> {
    associate::handle(pool, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success("associated"))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn list_wallets(
    State(pool): State<SqlitePool>,
    Query(query): Query<ListWalletsQuery>,
) -> Result<Response, WalletApiError> {
    let wallets = list::handle(pool, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(wallets))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum WalletApiError {
    #[error(transparent)]
    Associate(#[from] AssociateWalletError),
    #[error(transparent)]
    List(#[from] ListWalletsError),
}

impl IntoResponse for WalletApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            WalletApiError::Associate(AssociateWalletError::AddressRequired) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            WalletApiError::Associate(AssociateWalletError::DatasetNotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            WalletApiError::Associate(AssociateWalletError::AlreadyAssociated(_, _)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            WalletApiError::Associate(AssociateWalletError::Database(_))
            | WalletApiError::List(ListWalletsError::Database(_)) => {
                tracing::error!("wallet endpoint database error: {}", self);
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
