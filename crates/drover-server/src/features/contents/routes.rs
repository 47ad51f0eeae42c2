use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::commands::{import, ImportContentsCommand, ImportContentsError, NewContent};
use super::queries::{list, ListContentsError};

pub fn contents_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/:dataset_id", post(import_contents))
        .route("/:dataset_id", get(list_contents))
}

#[tracing::instrument(skip(pool, entries), fields(dataset_id = dataset_id, entries = entries.len()))]
async fn import_contents(
    State(pool): State<SqlitePool>,
    Path(dataset_id): Path<i64>,
    Json(entries): Json<Vec<NewContent>>,
) -> Result<Response, ContentApiError> {
    let results = import::handle(pool, ImportContentsCommand { dataset_id, entries }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(results))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn list_contents(
    State(pool): State<SqlitePool>,
    Path(dataset_id): Path<i64>,
) -> Result<Response, ContentApiError> {
    let contents = list::handle(pool, dataset_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(contents))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum ContentApiError {
    #[error(transparent)]
    Import(#[from] ImportContentsError),
    #[error(transparent)]
    List(#[from] ListContentsError),
}

impl IntoResponse for ContentApiError {
    fn into_response(self) -> Response {
        match &self {
            ContentApiError::Import(ImportContentsError::DatasetNotFound(_))
            | ContentApiError::List(ListContentsError::DatasetNotFound(_)) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("NOT_FOUND", self.to_string())),
            )
                .into_response(),
            ContentApiError::Import(ImportContentsError::Database(_))
            | ContentApiError::List(ListContentsError::Database(_)) => {
                tracing::error!("content endpoint database error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")),
                )
                    .into_response()
            }
        }
    }
}
