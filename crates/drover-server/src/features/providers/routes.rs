use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::commands::{
    create, update, CreateProviderCommand, CreateProviderError, UpdateProviderCommand,
    UpdateProviderError,
};
use super::queries::{list, ListProvidersError};

pub fn providers_routes() -> Router<SqlitePool> {
    Router::new()
        .route("/", post(create_provider))
        .route("/", get(list_providers))
        .route("/:actor_id", put(update_provider))
}

#[tracing::instrument(skip(pool, command), fields(actor_id = %command.actor_id))]
async fn create_provider(
    State(pool): State<SqlitePool>,
    Json(command): Json<CreateProviderCommand>,
) -> Result<Response, ProviderApiError> {
    let provider = create::handle(pool, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(provider))).into_response())
}

#[tracing::instrument(skip(pool))]
async fn list_providers(State(pool): State<SqlitePool>) -> Result<Response, ProviderApiError> {
    let providers = list::handle(pool).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(providers))).into_response())
}

#[tracing::instrument(skip(pool, command), fields(actor_id = %actor_id))]
async fn update_provider(
    State(pool): State<SqlitePool>,
    Path(actor_id): Path<String>,
    Json(mut command): Json<UpdateProviderCommand>,
) -> Result<Response, ProviderApiError> {
    command.actor_id = actor_id;
    let provider = update::handle(pool, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(provider))).into_response())
}

#[derive(Debug, thiserror::Error)]
enum ProviderApiError {
    #[error(transparent)]
    Create(#[from] CreateProviderError),
    #[error(transparent)]
    Update(#[from] UpdateProviderError),
    #[error(transparent)]
    List(#[from] ListProvidersError),
}

impl IntoResponse for ProviderApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ProviderApiError::Create(CreateProviderError::ActorIdValidation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ProviderApiError::Create(CreateProviderError::DuplicateActorId(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            ProviderApiError::Update(UpdateProviderError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ProviderApiError::Create(CreateProviderError::Database(_))
            | ProviderApiError::Update(UpdateProviderError::Database(_))
            | ProviderApiError::List(ListProvidersError::Database(_)) => {
                tracing::error!("provider endpoint database error: {}", self);
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
