use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::handlers::validate_required;
use crate::models::{CreateDomain, Domain, Identity};
use crate::services::DeploymentService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDomainRequest {
    pub environment_id: i64,
    pub host: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DomainResponse {
    pub id: i64,
    pub project_id: i64,
    pub environment_id: i64,
    pub host: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Domain> for DomainResponse {
    fn from(d: Domain) -> Self {
        Self {
            id: d.id,
            project_id: d.project_id,
            environment_id: d.environment_id,
            host: d.host,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DomainListResponse {
    pub data: Vec<DomainResponse>,
}

// ============ Handlers ============

/// Bind a host to one of the project's environments
#[utoipa::path(
    post,
    path = "/api/projects/{id}/domains",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    request_body = CreateDomainRequest,
    responses(
        (status = 200, description = "Domain created successfully", body = DomainResponse),
        (status = 400, description = "Validation error or environment outside the project"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project member"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Domains"
)]
pub async fn create_domain(
    identity: Identity,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(payload): Json<CreateDomainRequest>,
) -> AppResult<Json<DomainResponse>> {
    validate_required("host", &payload.host, 3, 255)?;

    let create_domain = CreateDomain {
        environment_id: payload.environment_id,
        host: payload.host,
    };

    let domain =
        DeploymentService::create_domain(state.store(), &identity, project_id, create_domain)
            .await?;
    Ok(Json(domain.into()))
}

/// List all domains in a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}/domains",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "List of domains", body = DomainListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Domains"
)]
pub async fn list_domains(
    _identity: Identity,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> AppResult<Json<DomainListResponse>> {
    let domains = DeploymentService::list_domains(state.store(), project_id).await?;

    Ok(Json(DomainListResponse {
        data: domains.into_iter().map(|d| d.into()).collect(),
    }))
}

/// Get a domain by ID
#[utoipa::path(
    get,
    path = "/api/domains/{id}",
    params(
        ("id" = i64, Path, description = "Domain ID")
    ),
    responses(
        (status = 200, description = "Domain details", body = DomainResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Domain not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Domains"
)]
pub async fn get_domain(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DomainResponse>> {
    let domain = DeploymentService::get_domain(state.store(), id).await?;
    Ok(Json(domain.into()))
}

/// Delete a domain
#[utoipa::path(
    delete,
    path = "/api/domains/{id}",
    params(
        ("id" = i64, Path, description = "Domain ID")
    ),
    responses(
        (status = 200, description = "Domain deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project member"),
        (status = 404, description = "Domain not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Domains"
)]
pub async fn delete_domain(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<()> {
    DeploymentService::delete_domain(state.store(), &identity, id).await
}
