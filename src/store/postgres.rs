use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDeployment, CreateDomain, CreateEnvironment, CreateGroup, CreateProject, CreateUser,
    Deployment, DeploymentFilter, Domain, Environment, Group, Member, Membership, PageRequest,
    Project, ProjectFilter, Role, Subject, User,
};
use crate::repositories::{
    DeploymentRepository, DomainRepository, EnvironmentRepository, GroupRepository,
    MembershipRepository, ProjectRepository, Repository, UserRepository,
};
use crate::store::ResourceStore;

/// PostgreSQL-backed store built on the SeaORM repositories
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn upsert_membership_once(
        &self,
        subject: Subject,
        user_id: i64,
        role: Role,
    ) -> AppResult<Membership> {
        let txn = self.db.begin().await?;
        let membership = MembershipRepository::upsert(&txn, subject, user_id, role).await?;
        txn.commit().await?;
        Ok(membership)
    }
}

#[async_trait]
impl ResourceStore for SeaOrmStore {
    async fn create_user(&self, input: &CreateUser, password_hash: &str) -> AppResult<User> {
        UserRepository::create(&self.db, input, password_hash).await
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        UserRepository::find_active(&self.db, id).await
    }

    async fn find_user_by_name(&self, name: &str) -> AppResult<Option<User>> {
        UserRepository::find_by_name(&self.db, name).await
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let txn = self.db.begin().await?;
        let updated = UserRepository::update(&txn, user).await?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn tombstone_user(&self, id: i64) -> AppResult<bool> {
        UserRepository::tombstone(&self.db, id).await
    }

    async fn list_users(&self, page: PageRequest) -> AppResult<Vec<User>> {
        UserRepository::list(&self.db, page.limit(), page.offset()).await
    }

    async fn count_users(&self) -> AppResult<u64> {
        UserRepository::count(&self.db).await
    }

    async fn create_group_with_admin(
        &self,
        creator_id: i64,
        input: &CreateGroup,
    ) -> AppResult<(Group, Membership)> {
        // Dropping the transaction on an early return rolls it back
        let txn = self.db.begin().await?;
        let group = GroupRepository::create(&txn, creator_id, input).await?;
        let membership = MembershipRepository::create(
            &txn,
            Subject::Group(group.id),
            creator_id,
            Role::ADMINISTRATOR,
        )
        .await?;
        txn.commit().await?;

        Ok((group, membership))
    }

    async fn find_group(&self, id: i64) -> AppResult<Option<Group>> {
        GroupRepository::find_active(&self.db, id).await
    }

    async fn update_group(&self, group: &Group) -> AppResult<Group> {
        GroupRepository::update(&self.db, group).await
    }

    async fn tombstone_group(&self, id: i64) -> AppResult<bool> {
        GroupRepository::tombstone(&self.db, id).await
    }

    async fn list_groups(&self, page: PageRequest) -> AppResult<Vec<Group>> {
        GroupRepository::list(&self.db, page.limit(), page.offset()).await
    }

    async fn count_groups(&self) -> AppResult<u64> {
        GroupRepository::count(&self.db).await
    }

    async fn create_project_with_admin(
        &self,
        creator_id: i64,
        input: &CreateProject,
    ) -> AppResult<(Project, Membership)> {
        let txn = self.db.begin().await?;
        let project = ProjectRepository::create(&txn, creator_id, input).await?;
        let membership = MembershipRepository::create(
            &txn,
            Subject::Project(project.id),
            creator_id,
            Role::ADMINISTRATOR,
        )
        .await?;
        txn.commit().await?;

        Ok((project, membership))
    }

    async fn find_project(&self, id: i64) -> AppResult<Option<Project>> {
        ProjectRepository::find_active(&self.db, id).await
    }

    async fn find_project_by_name(&self, name: &str) -> AppResult<Option<Project>> {
        ProjectRepository::find_by_name(&self.db, name).await
    }

    async fn update_project(&self, project: &Project) -> AppResult<Project> {
        let txn = self.db.begin().await?;
        let updated = ProjectRepository::update(&txn, project).await?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn tombstone_project(&self, id: i64) -> AppResult<bool> {
        ProjectRepository::tombstone(&self.db, id).await
    }

    async fn list_projects(
        &self,
        filter: ProjectFilter,
        page: PageRequest,
    ) -> AppResult<Vec<Project>> {
        ProjectRepository::list(&self.db, filter, page.limit(), page.offset()).await
    }

    async fn count_projects(&self, filter: ProjectFilter) -> AppResult<u64> {
        ProjectRepository::count(&self.db, filter).await
    }

    async fn upsert_membership(
        &self,
        subject: Subject,
        user_id: i64,
        role: Role,
    ) -> AppResult<Membership> {
        match self.upsert_membership_once(subject, user_id, role).await {
            // Lost the insert race; the winner's row is committed and visible now
            Err(AppError::Conflict(_)) => {
                tracing::debug!(user_id, "membership insert raced, retrying as update");
                self.upsert_membership_once(subject, user_id, role).await
            }
            result => result,
        }
    }

    async fn find_memberships(
        &self,
        subject: Subject,
        user_id: i64,
    ) -> AppResult<Vec<Membership>> {
        MembershipRepository::find_for(&self.db, subject, user_id).await
    }

    async fn tombstone_memberships(&self, subject: Subject, user_id: i64) -> AppResult<u64> {
        MembershipRepository::tombstone_for(&self.db, subject, user_id).await
    }

    async fn list_members(&self, subject: Subject) -> AppResult<Vec<Member>> {
        MembershipRepository::list_members(&self.db, subject).await
    }

    async fn create_environment(
        &self,
        project_id: i64,
        creator_id: i64,
        input: &CreateEnvironment,
    ) -> AppResult<Environment> {
        EnvironmentRepository::create(&self.db, project_id, creator_id, input).await
    }

    async fn find_environment(&self, id: i64) -> AppResult<Option<Environment>> {
        EnvironmentRepository::find_active(&self.db, id).await
    }

    async fn list_environments(&self, project_id: i64) -> AppResult<Vec<Environment>> {
        EnvironmentRepository::list_by_project(&self.db, project_id).await
    }

    async fn tombstone_environment(&self, id: i64) -> AppResult<bool> {
        EnvironmentRepository::tombstone(&self.db, id).await
    }

    async fn create_domain(&self, project_id: i64, input: &CreateDomain) -> AppResult<Domain> {
        DomainRepository::create(&self.db, project_id, input).await
    }

    async fn find_domain(&self, id: i64) -> AppResult<Option<Domain>> {
        DomainRepository::find_active(&self.db, id).await
    }

    async fn list_domains(&self, project_id: i64) -> AppResult<Vec<Domain>> {
        DomainRepository::list_by_project(&self.db, project_id).await
    }

    async fn tombstone_domain(&self, id: i64) -> AppResult<bool> {
        DomainRepository::tombstone(&self.db, id).await
    }

    async fn create_deployment(
        &self,
        project_id: i64,
        actor_id: i64,
        input: &CreateDeployment,
    ) -> AppResult<Deployment> {
        DeploymentRepository::create(&self.db, project_id, actor_id, input).await
    }

    async fn find_deployment(&self, id: i64) -> AppResult<Option<Deployment>> {
        DeploymentRepository::find_active(&self.db, id).await
    }

    async fn list_deployments(
        &self,
        project_id: i64,
        filter: DeploymentFilter,
    ) -> AppResult<Vec<Deployment>> {
        DeploymentRepository::list_by_project(&self.db, project_id, filter).await
    }

    async fn tombstone_deployment(&self, id: i64) -> AppResult<bool> {
        DeploymentRepository::tombstone(&self.db, id).await
    }
}
