use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::handlers::{validate_optional, validate_required, PaginationParams};
use crate::models::{CreateGroup, Group, Identity, Page, Patch, UpdateGroup};
use crate::services::HierarchyService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Omitted fields are left untouched; `"description": null` clears it
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub creator_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Group> for GroupResponse {
    fn from(g: Group) -> Self {
        Self {
            id: g.id,
            name: g.name,
            description: g.description,
            owner_id: g.owner_id,
            creator_id: g.creator_id,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupListResponse {
    pub data: Vec<GroupResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl From<Page<Group>> for GroupListResponse {
    fn from(page: Page<Group>) -> Self {
        Self {
            data: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

// ============ Handlers ============

/// Create a new group; the caller becomes its administrator
#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created successfully", body = GroupResponse),
        (status = 401, description = "Unauthorized"),
        (status = 400, description = "Validation error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Groups"
)]
pub async fn create_group(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreateGroupRequest>,
) -> AppResult<Json<GroupResponse>> {
    validate_required("name", &payload.name, 2, 128)?;
    validate_optional("description", payload.description.as_deref(), 0, 255)?;

    let create_group = CreateGroup {
        name: payload.name,
        description: payload.description,
    };

    let group = HierarchyService::create_group(state.store(), &identity, create_group).await?;
    Ok(Json(group.into()))
}

/// List active groups
#[utoipa::path(
    get,
    path = "/api/groups",
    params(PaginationParams),
    responses(
        (status = 200, description = "List of groups", body = GroupListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Groups"
)]
pub async fn list_groups(
    _identity: Identity,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<GroupListResponse>> {
    let page = HierarchyService::list_groups(state.store(), params.to_request()).await?;
    Ok(Json(page.into()))
}

/// Get a group by ID
#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    params(
        ("id" = i64, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group details", body = GroupResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Groups"
)]
pub async fn get_group(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<GroupResponse>> {
    let group = HierarchyService::get_group(state.store(), id).await?;
    Ok(Json(group.into()))
}

/// Update a group
#[utoipa::path(
    put,
    path = "/api/groups/{id}",
    params(
        ("id" = i64, Path, description = "Group ID")
    ),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated successfully", body = GroupResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a group administrator"),
        (status = 404, description = "Group not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Groups"
)]
pub async fn update_group(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateGroupRequest>,
) -> AppResult<Json<GroupResponse>> {
    validate_optional("name", payload.name.as_deref(), 2, 128)?;
    validate_optional(
        "description",
        payload.description.as_value().map(String::as_str),
        0,
        255,
    )?;

    let update_group = UpdateGroup {
        name: payload.name,
        description: payload.description,
    };

    let group = HierarchyService::update_group(state.store(), &identity, id, update_group).await?;
    Ok(Json(group.into()))
}

/// Delete a group; its projects are kept
#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(
        ("id" = i64, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a group administrator"),
        (status = 404, description = "Group not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Groups"
)]
pub async fn delete_group(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<()> {
    HierarchyService::delete_group(state.store(), &identity, id).await
}
