pub mod auth;
pub mod common;
pub mod deployment;
pub mod domain;
pub mod environment;
pub mod group;
pub mod member;
pub mod project;
pub mod user;

pub use auth::{login, me, register, AuthResponse, LoginRequest, RegisterRequest};
pub use common::{validate_optional, validate_required, PaginationParams};
pub use deployment::{
    create_deployment, delete_deployment, get_deployment, list_deployments,
    CreateDeploymentRequest, DeploymentListParams, DeploymentListResponse, DeploymentResponse,
};
pub use domain::{
    create_domain, delete_domain, get_domain, list_domains, CreateDomainRequest,
    DomainListResponse, DomainResponse,
};
pub use environment::{
    create_environment, delete_environment, get_environment, list_environments,
    CreateEnvironmentRequest, EnvironmentListResponse, EnvironmentResponse,
};
pub use group::{
    create_group, delete_group, get_group, list_groups, update_group, CreateGroupRequest,
    GroupListResponse, GroupResponse, UpdateGroupRequest,
};
pub use member::{
    add_group_member, add_project_member, list_group_members, list_project_members,
    remove_group_member, remove_project_member, AddMemberRequest, MemberListResponse,
    MemberResponse,
};
pub use project::{
    create_project, delete_project, get_project, list_projects, update_project,
    CreateProjectRequest, ProjectListParams, ProjectListResponse, ProjectResponse,
    UpdateProjectRequest,
};
pub use user::{
    delete_user, get_user, list_users, update_user, UpdateUserRequest, UserListResponse,
};
