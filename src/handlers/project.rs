use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::handlers::{validate_optional, validate_required};
use crate::models::{
    CreateProject, Identity, Page, PageRequest, Patch, Project, ProjectFilter, UpdateProject,
};
use crate::services::HierarchyService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
    pub zh_name: String,
    pub description: Option<String>,
    pub group_id: Option<i64>,
}

/// Omitted fields are left untouched; `null` clears `description` or `group_id`
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub zh_name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub group_id: Patch<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProjectListParams {
    /// Only projects in this group
    pub group_id: Option<i64>,
    #[param(default = 1, minimum = 1)]
    pub page: Option<i64>,
    #[param(default = 10, minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i64,
    pub name: String,
    pub zh_name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub creator_id: i64,
    pub group_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            zh_name: p.zh_name,
            description: p.description,
            owner_id: p.owner_id,
            creator_id: p.creator_id,
            group_id: p.group_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub data: Vec<ProjectResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl From<Page<Project>> for ProjectListResponse {
    fn from(page: Page<Project>) -> Self {
        Self {
            data: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

// ============ Handlers ============

/// Create a new project; the caller becomes its administrator
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created successfully", body = ProjectResponse),
        (status = 400, description = "Validation error or unknown group"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a member of the group"),
        (status = 409, description = "Project name already taken")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn create_project(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    validate_required("name", &payload.name, 2, 128)?;
    validate_required("zh_name", &payload.zh_name, 2, 128)?;
    validate_optional("description", payload.description.as_deref(), 0, 255)?;

    let create_project = CreateProject {
        name: payload.name,
        zh_name: payload.zh_name,
        description: payload.description,
        group_id: payload.group_id,
    };

    let project =
        HierarchyService::create_project(state.store(), &identity, create_project).await?;
    Ok(Json(project.into()))
}

/// List active projects, optionally within one group
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectListParams),
    responses(
        (status = 200, description = "List of projects", body = ProjectListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    _identity: Identity,
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<ProjectListResponse>> {
    let filter = ProjectFilter {
        group_id: params.group_id,
    };
    let page = PageRequest::new(params.page, params.page_size);

    let page = HierarchyService::list_projects(state.store(), filter, page).await?;
    Ok(Json(page.into()))
}

/// Get a project by ID
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project details", body = ProjectResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn get_project(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProjectResponse>> {
    let project = HierarchyService::get_project(state.store(), id).await?;
    Ok(Json(project.into()))
}

/// Update a project
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated successfully", body = ProjectResponse),
        (status = 400, description = "Validation error or unknown group"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project administrator"),
        (status = 404, description = "Project not found"),
        (status = 409, description = "Project name already taken")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn update_project(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    validate_optional("name", payload.name.as_deref(), 2, 128)?;
    validate_optional("zh_name", payload.zh_name.as_deref(), 2, 128)?;
    validate_optional(
        "description",
        payload.description.as_value().map(String::as_str),
        0,
        255,
    )?;

    let update_project = UpdateProject {
        name: payload.name,
        zh_name: payload.zh_name,
        description: payload.description,
        group_id: payload.group_id,
    };

    let project =
        HierarchyService::update_project(state.store(), &identity, id, update_project).await?;
    Ok(Json(project.into()))
}

/// Delete a project; its environments, domains and deployments are kept
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project administrator"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<()> {
    HierarchyService::delete_project(state.store(), &identity, id).await
}
