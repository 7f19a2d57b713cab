//! Membership routes, mounted under both `/api/groups/{id}` and
//! `/api/projects/{id}`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::models::{Identity, Member, Membership, Role, Subject, SubjectKind, UserSummary};
use crate::services::MembershipService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: i64,
    /// 1 (administrator) to 10
    pub role: i16,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberResponse {
    pub id: i64,
    #[schema(value_type = String, example = "group")]
    pub subject_kind: SubjectKind,
    pub subject_id: i64,
    pub user_id: i64,
    #[schema(value_type = i16)]
    pub role: Role,
    /// Absent when the user account has been deleted
    pub user: Option<UserSummary>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
}

impl MemberResponse {
    fn new(membership: Membership, user: Option<UserSummary>) -> Self {
        Self {
            id: membership.id,
            subject_kind: membership.subject_kind,
            subject_id: membership.subject_id,
            user_id: membership.user_id,
            role: membership.role,
            user,
            created_at: membership.created_at,
        }
    }
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self::new(member.membership, member.user)
    }
}

impl From<Membership> for MemberResponse {
    fn from(membership: Membership) -> Self {
        Self::new(membership, None)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberListResponse {
    pub data: Vec<MemberResponse>,
}

// ============ Shared implementations ============

async fn list(state: &AppState, subject: Subject) -> AppResult<Json<MemberListResponse>> {
    let members = MembershipService::list_members(state.store(), subject).await?;
    Ok(Json(MemberListResponse {
        data: members.into_iter().map(Into::into).collect(),
    }))
}

async fn add(
    state: &AppState,
    identity: &Identity,
    subject: Subject,
    payload: AddMemberRequest,
) -> AppResult<Json<MemberResponse>> {
    let role = Role::new(payload.role)?;
    let membership =
        MembershipService::add_member(state.store(), identity, subject, payload.user_id, role)
            .await?;
    Ok(Json(membership.into()))
}

// ============ Group handlers ============

/// List members of a group
#[utoipa::path(
    get,
    path = "/api/groups/{id}/members",
    params(
        ("id" = i64, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group members", body = MemberListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Members"
)]
pub async fn list_group_members(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MemberListResponse>> {
    list(&state, Subject::Group(id)).await
}

/// Add a user to a group, or change their role
#[utoipa::path(
    post,
    path = "/api/groups/{id}/members",
    params(
        ("id" = i64, Path, description = "Group ID")
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Membership created or updated", body = MemberResponse),
        (status = 400, description = "Invalid role or unknown user"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a group administrator"),
        (status = 404, description = "Group not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Members"
)]
pub async fn add_group_member(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddMemberRequest>,
) -> AppResult<Json<MemberResponse>> {
    add(&state, &identity, Subject::Group(id), payload).await
}

/// Remove a user from a group
#[utoipa::path(
    delete,
    path = "/api/groups/{id}/members/{user_id}",
    params(
        ("id" = i64, Path, description = "Group ID"),
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Membership removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a group administrator"),
        (status = 404, description = "Group or membership not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Members"
)]
pub async fn remove_group_member(
    identity: Identity,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<()> {
    MembershipService::remove_member(state.store(), &identity, Subject::Group(id), user_id).await
}

// ============ Project handlers ============

/// List members of a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}/members",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project members", body = MemberListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Members"
)]
pub async fn list_project_members(
    _identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MemberListResponse>> {
    list(&state, Subject::Project(id)).await
}

/// Add a user to a project, or change their role
#[utoipa::path(
    post,
    path = "/api/projects/{id}/members",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Membership created or updated", body = MemberResponse),
        (status = 400, description = "Invalid role or unknown user"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project administrator"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Members"
)]
pub async fn add_project_member(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddMemberRequest>,
) -> AppResult<Json<MemberResponse>> {
    add(&state, &identity, Subject::Project(id), payload).await
}

/// Remove a user from a project
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/members/{user_id}",
    params(
        ("id" = i64, Path, description = "Project ID"),
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Membership removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a project administrator"),
        (status = 404, description = "Project or membership not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Members"
)]
pub async fn remove_project_member(
    identity: Identity,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> AppResult<()> {
    MembershipService::remove_member(state.store(), &identity, Subject::Project(id), user_id).await
}
