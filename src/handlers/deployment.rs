use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::handlers::{validate_optional, validate_required};
use crate::models::{
    CreateDeployment, Deployment, DeploymentFilter, Identity, TargetKind, TARGET_VALUE_MAX_LEN,
};
use crate::services::DeploymentService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeploymentRequest {
    pub environment_id: i64,
    pub remark: Option<String>,
    /// Target classification, 1 to 10
    pub target_kind: i16,
    /// Image tag, commit, URL or whatever the target kind calls for
    pub target_value: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeploymentListParams {
    /// Only deployments to this environment
    pub environment_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentResponse {
    pub id: i64,
    pub project_id: i64,
    pub environment_id: i64,
    pub remark: Option<String>,
    #[schema(value_type = i16)]
    pub target_kind: TargetKind,
    pub target_value: String,
    pub creator_id: i64,
    pub last_actor_id: i64,
    pub is_active: Option<bool>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Deployment> for DeploymentResponse {
    fn from(d: Deployment) -> Self {
        Self {
            id: d.id,
            project_id: d.project_id,
            environment_id: d.environment_id,
            remark: d.remark,
            target_kind: d.target_kind,
            target_value: d.target_value,
            creator_id: d.creator_id,
            last_actor_id: d.last_actor_id,
            is_active: d.is_active,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentListResponse {
    pub data: Vec<DeploymentResponse>,
}

// ============ Handlers ============

/// Record a deployment target for one of the project's environments
#[utoipa::path(
    post,
    path = "/api/projects/{id}/deployments",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    request_body = CreateDeploymentRequest,
    responses(
        (status = 200, description = "Deployment recorded", body = DeploymentResponse),
        (status = 400, description = "Validation error or environment outside the project"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project member"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Deployments"
)]
pub async fn create_deployment(
    identity: Identity,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(payload): Json<CreateDeploymentRequest>,
) -> AppResult<Json<DeploymentResponse>> {
    validate_required("target_value", &payload.target_value, 3, TARGET_VALUE_MAX_LEN)?;
    validate_optional("remark", payload.remark.as_deref(), 0, 255)?;

    let create_deployment = CreateDeployment {
        environment_id: payload.environment_id,
        remark: payload.remark,
        target_kind: TargetKind::new(payload.target_kind)?,
        target_value: payload.target_value,
    };

    let deployment = DeploymentService::create_deployment(
        state.store(),
        &identity,
        project_id,
        create_deployment,
    )
    .await?;
    Ok(Json(deployment.into()))
}

/// List deployments in a project, optionally for one environment
#[utoipa::path(
    get,
    path = "/api/projects/{id}/deployments",
    params(
        ("id" = i64, Path, description = "Project ID"),
        DeploymentListParams
    ),
    responses(
        (status = 200, description = "List of deployments", body = DeploymentListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Deployments"
)]
pub async fn list_deployments(
    _identity: Identity,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Query(params): Query<DeploymentListParams>,
) -> AppResult<Json<DeploymentListResponse>> {
    let filter = DeploymentFilter {
        environment_id: params.environment_id,
    };
    let deployments =
        DeploymentService::list_deployments(state.store(), project_id, filter).await?;

    Ok(Json(DeploymentListResponse {
        data: deployments.into_iter().map(|d| d.into()).collect(),
    }))
}

/// Get a deployment by ID
#[utoipa::path(
    get,
    path = "/api/deployments/{id}",
    params(
        ("id" = i64, Path, description = "Deployment ID")
    ),
    responses(
        (status = 200, description = "Deployment details", body = DeploymentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Deployment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Deployments"
)]
pub async fn get_deployment(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeploymentResponse>> {
    let deployment = DeploymentService::get_deployment(state.store(), id).await?;
    Ok(Json(deployment.into()))
}

/// Delete a deployment record
#[utoipa::path(
    delete,
    path = "/api/deployments/{id}",
    params(
        ("id" = i64, Path, description = "Deployment ID")
    ),
    responses(
        (status = 200, description = "Deployment deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project member"),
        (status = 404, description = "Deployment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Deployments"
)]
pub async fn delete_deployment(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<()> {
    DeploymentService::delete_deployment(state.store(), &identity, id).await
}
