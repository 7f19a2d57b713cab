use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::handlers::validate_required;
use crate::models::{CreateEnvironment, Environment, EnvironmentKind, Identity};
use crate::services::DeploymentService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEnvironmentRequest {
    pub name: String,
    /// Environment classification, 1 to 4
    pub kind: i16,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnvironmentResponse {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[schema(value_type = i16)]
    pub kind: EnvironmentKind,
    pub creator_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Environment> for EnvironmentResponse {
    fn from(e: Environment) -> Self {
        Self {
            id: e.id,
            project_id: e.project_id,
            name: e.name,
            kind: e.kind,
            creator_id: e.creator_id,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnvironmentListResponse {
    pub data: Vec<EnvironmentResponse>,
}

// ============ Handlers ============

/// Create a new environment in a project
#[utoipa::path(
    post,
    path = "/api/projects/{id}/environments",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    request_body = CreateEnvironmentRequest,
    responses(
        (
            status = 200,
            description = "Environment created successfully",
            body = EnvironmentResponse
        ),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project member"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Environments"
)]
pub async fn create_environment(
    identity: Identity,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(payload): Json<CreateEnvironmentRequest>,
) -> AppResult<Json<EnvironmentResponse>> {
    validate_required("name", &payload.name, 2, 128)?;

    let create_env = CreateEnvironment {
        name: payload.name,
        kind: EnvironmentKind::new(payload.kind)?,
    };

    let environment =
        DeploymentService::create_environment(state.store(), &identity, project_id, create_env)
            .await?;
    Ok(Json(environment.into()))
}

/// List all environments in a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}/environments",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "List of environments", body = EnvironmentListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Environments"
)]
pub async fn list_environments(
    _identity: Identity,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> AppResult<Json<EnvironmentListResponse>> {
    let environments = DeploymentService::list_environments(state.store(), project_id).await?;

    Ok(Json(EnvironmentListResponse {
        data: environments.into_iter().map(|e| e.into()).collect(),
    }))
}

/// Get an environment by ID
#[utoipa::path(
    get,
    path = "/api/environments/{id}",
    params(
        ("id" = i64, Path, description = "Environment ID")
    ),
    responses(
        (status = 200, description = "Environment details", body = EnvironmentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Environment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Environments"
)]
pub async fn get_environment(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EnvironmentResponse>> {
    let environment = DeploymentService::get_environment(state.store(), id).await?;
    Ok(Json(environment.into()))
}

/// Delete an environment; its domains and deployments are kept
#[utoipa::path(
    delete,
    path = "/api/environments/{id}",
    params(
        ("id" = i64, Path, description = "Environment ID")
    ),
    responses(
        (status = 200, description = "Environment deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project member"),
        (status = 404, description = "Environment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Environments"
)]
pub async fn delete_environment(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<()> {
    DeploymentService::delete_environment(state.store(), &identity, id).await
}
