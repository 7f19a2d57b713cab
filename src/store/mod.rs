pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::SeaOrmStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    CreateDeployment, CreateDomain, CreateEnvironment, CreateGroup, CreateProject, CreateUser,
    Deployment, DeploymentFilter, Domain, Environment, Group, Member, Membership, PageRequest,
    Project, ProjectFilter, Role, Subject, User,
};

/// Durable storage for every resource the service manages.
///
/// Reads never return tombstoned rows. Operations that write more than one
/// row (create-and-enroll, membership upsert) are atomic per call.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    // Users
    async fn create_user(&self, input: &CreateUser, password_hash: &str) -> AppResult<User>;
    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;
    async fn find_user_by_name(&self, name: &str) -> AppResult<Option<User>>;
    async fn update_user(&self, user: &User) -> AppResult<User>;
    async fn tombstone_user(&self, id: i64) -> AppResult<bool>;
    async fn list_users(&self, page: PageRequest) -> AppResult<Vec<User>>;
    async fn count_users(&self) -> AppResult<u64>;

    // Groups
    /// Insert the group and an administrator membership for its creator together
    async fn create_group_with_admin(
        &self,
        creator_id: i64,
        input: &CreateGroup,
    ) -> AppResult<(Group, Membership)>;
    async fn find_group(&self, id: i64) -> AppResult<Option<Group>>;
    async fn update_group(&self, group: &Group) -> AppResult<Group>;
    async fn tombstone_group(&self, id: i64) -> AppResult<bool>;
    async fn list_groups(&self, page: PageRequest) -> AppResult<Vec<Group>>;
    async fn count_groups(&self) -> AppResult<u64>;

    // Projects
    /// Insert the project and an administrator membership for its creator
    /// together; `Conflict` when the name is held by an active project
    async fn create_project_with_admin(
        &self,
        creator_id: i64,
        input: &CreateProject,
    ) -> AppResult<(Project, Membership)>;
    async fn find_project(&self, id: i64) -> AppResult<Option<Project>>;
    async fn find_project_by_name(&self, name: &str) -> AppResult<Option<Project>>;
    async fn update_project(&self, project: &Project) -> AppResult<Project>;
    async fn tombstone_project(&self, id: i64) -> AppResult<bool>;
    async fn list_projects(&self, filter: ProjectFilter, page: PageRequest)
        -> AppResult<Vec<Project>>;
    async fn count_projects(&self, filter: ProjectFilter) -> AppResult<u64>;

    // Memberships
    /// Enroll or re-role a user; at most one active row per (subject, user) survives
    async fn upsert_membership(
        &self,
        subject: Subject,
        user_id: i64,
        role: Role,
    ) -> AppResult<Membership>;
    async fn find_memberships(&self, subject: Subject, user_id: i64)
        -> AppResult<Vec<Membership>>;
    /// Returns the number of memberships tombstoned
    async fn tombstone_memberships(&self, subject: Subject, user_id: i64) -> AppResult<u64>;
    async fn list_members(&self, subject: Subject) -> AppResult<Vec<Member>>;

    // Environments
    async fn create_environment(
        &self,
        project_id: i64,
        creator_id: i64,
        input: &CreateEnvironment,
    ) -> AppResult<Environment>;
    async fn find_environment(&self, id: i64) -> AppResult<Option<Environment>>;
    async fn list_environments(&self, project_id: i64) -> AppResult<Vec<Environment>>;
    async fn tombstone_environment(&self, id: i64) -> AppResult<bool>;

    // Domains
    async fn create_domain(&self, project_id: i64, input: &CreateDomain) -> AppResult<Domain>;
    async fn find_domain(&self, id: i64) -> AppResult<Option<Domain>>;
    async fn list_domains(&self, project_id: i64) -> AppResult<Vec<Domain>>;
    async fn tombstone_domain(&self, id: i64) -> AppResult<bool>;

    // Deployments
    async fn create_deployment(
        &self,
        project_id: i64,
        actor_id: i64,
        input: &CreateDeployment,
    ) -> AppResult<Deployment>;
    async fn find_deployment(&self, id: i64) -> AppResult<Option<Deployment>>;
    async fn list_deployments(
        &self,
        project_id: i64,
        filter: DeploymentFilter,
    ) -> AppResult<Vec<Deployment>>;
    async fn tombstone_deployment(&self, id: i64) -> AppResult<bool>;
}
