use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::commands::{
    create, delete as delete_cmd, CreateProfileCommand, CreateProfileError, DeleteProfileCommand,
    DeleteProfileError,
};
use super::queries::{list, ListProfilesError};

pub fn profiles_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", post(create_profile))
        .route("/", get(list_profiles))
        .route("/", delete(delete_profile))
}

#[tracing::instrument(skip(pool, command), fields(provider = %command.provider_actor_id, dataset_id = command.dataset_id))]
async fn create_profile(
    State(pool): State<SqlitePool>,
    Json(command): Json<CreateProfileCommand>,
) -> Result<Response, ProfileApiError> {
    let profile = create::handle(pool, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn list_profiles(State(pool): State<SqlitePool>) -> Result<Response, ProfileApiError> {
    let profiles = list::handle(pool).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(profiles))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(provider = %command.provider_actor_id, dataset_id = command.dataset_id))]
async fn delete_profile(
    State(pool): State<SqlitePool>,
    Json(command): Json<DeleteProfileCommand>,
) -> Result<Response, ProfileApiError> {
    delete_cmd::handle(pool, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success("deleted"))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum ProfileApiError {
    #[error(transparent)]
    Create(#[from] CreateProfileError),
    #[error(transparent)]
    Delete(#[from] DeleteProfileError),
    #[error(transparent)]
    List(#[from] ListProfilesError),
}

impl IntoResponse for ProfileApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ProfileApiError::Create(CreateProfileError::ProviderNotFound(_))
            | ProfileApiError::Create(CreateProfileError::DatasetNotFound(_))
            | ProfileApiError::Delete(DeleteProfileError::NotFound(_, _)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ProfileApiError::Create(CreateProfileError::Duplicate(_, _)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            ProfileApiError::Create(CreateProfileError::Database(_))
            | ProfileApiError::Delete(DeleteProfileError::Database(_))
            | ProfileApiError::List(ListProfilesError::Database(_)) => {
                tracing::error!("replication profile endpoint database error: {}", self);
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
        let router = profiles_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
