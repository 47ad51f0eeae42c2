use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::commands::{create, CreateDatasetCommand, CreateDatasetError};
use super::queries::{list, ListDatasetsError};

pub fn datasets_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", post(create_dataset))
        .route("/", get(list_datasets))
}

#[tracing::instrument(skip(pool, command), fields(name = %command.name))]
async fn create_dataset(
    State(pool): State<SqlitePool>,
    Json(command): Json<CreateDatasetCommand>,
) -> Result<Response, DatasetApiError> {
    let dataset = create::handle(pool, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dataset))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn list_datasets(State(pool): State<SqlitePool>) -> Result<Response, DatasetApiError> {
    let datasets = list::handle(pool).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(datasets))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum DatasetApiError {
    #[error(transparent)]
    Create(#[from] CreateDatasetError),
    #[error(transparent)]
    List(#[from] ListDatasetsError),
}

impl IntoResponse for DatasetApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            DatasetApiError::Create(CreateDatasetError::NameValidation(_))
            | DatasetApiError::Create(CreateDatasetError::InvalidQuota)
            | DatasetApiError::Create(CreateDatasetError::InvalidDuration) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            DatasetApiError::Create(CreateDatasetError::DuplicateName(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            DatasetApiError::Create(CreateDatasetError::Database(_))
            | DatasetApiError::List(ListDatasetsError::Database(_)) => {
                tracing::error!("dataset endpoint database error: {}", self);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let router = datasets_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let err = DatasetApiError::Create(CreateDatasetError::DuplicateName("x".into()));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
