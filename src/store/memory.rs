use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDeployment, CreateDomain, CreateEnvironment, CreateGroup, CreateProject, CreateUser,
    Deployment, DeploymentFilter, Domain, Environment, Group, Member, Membership, PageRequest,
    Project, ProjectFilter, RecordStatus, Role, Subject, User, UserSummary,
};
use crate::store::ResourceStore;

/// In-memory store for tests and local runs without a database
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<InMemoryStoreInner>>,
}

/// One table: rows keyed by id plus the last id handed out
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert(&mut self, id: i64, row: T) -> T {
        self.rows.insert(id, row.clone());
        row
    }
}

/// Access to the lifecycle fields every stored row carries
trait Stored: Clone {
    fn status(&self) -> RecordStatus;
    fn tombstone(&mut self, at: OffsetDateTime);
}

macro_rules! impl_stored {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Stored for $ty {
                fn status(&self) -> RecordStatus {
                    self.status
                }

                fn tombstone(&mut self, at: OffsetDateTime) {
                    self.status = RecordStatus::Tombstoned;
                    self.updated_at = at;
                }
            }
        )+
    };
}

impl_stored!(User, Group, Project, Membership, Environment, Domain, Deployment);

impl<T: Stored> Table<T> {
    fn active(&self, id: i64) -> Option<T> {
        self.rows
            .get(&id)
            .filter(|row| row.status().is_active())
            .cloned()
    }

    fn active_rows(&self) -> impl Iterator<Item = &T> {
        self.rows.values().filter(|row| row.status().is_active())
    }

    fn tombstone(&mut self, id: i64) -> bool {
        match self.rows.get_mut(&id) {
            Some(row) if row.status().is_active() => {
                row.tombstone(OffsetDateTime::now_utc());
                true
            }
            _ => false,
        }
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    users: Table<User>,
    groups: Table<Group>,
    projects: Table<Project>,
    memberships: Table<Membership>,
    environments: Table<Environment>,
    domains: Table<Domain>,
    deployments: Table<Deployment>,
}

impl InMemoryStoreInner {
    fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users.active_rows().find(|u| u.name == name)
    }

    fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.active_rows().find(|p| p.name == name)
    }

    fn memberships_for(&self, subject: Subject, user_id: i64) -> Vec<Membership> {
        self.memberships
            .active_rows()
            .filter(|m| m.subject() == subject && m.user_id == user_id)
            .cloned()
            .collect()
    }

    fn insert_membership(&mut self, subject: Subject, user_id: i64, role: Role) -> Membership {
        let now = OffsetDateTime::now_utc();
        let id = self.memberships.next_id();
        self.memberships.insert(
            id,
            Membership {
                id,
                subject_kind: subject.kind(),
                subject_id: subject.id(),
                user_id,
                role,
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            },
        )
    }
}

fn paginate<T>(rows: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    rows.skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InMemoryStoreInner::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn create_user(&self, input: &CreateUser, password_hash: &str) -> AppResult<User> {
        let mut inner = self.inner.lock().await;
        if inner.user_by_name(&input.name).is_some() {
            return Err(AppError::Conflict(format!("User '{}'", input.name)));
        }

        let now = OffsetDateTime::now_utc();
        let id = inner.users.next_id();
        Ok(inner.users.insert(
            id,
            User {
                id,
                name: input.name.clone(),
                password_hash: password_hash.to_string(),
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            },
        ))
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.active(id))
    }

    async fn find_user_by_name(&self, name: &str) -> AppResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.user_by_name(name).cloned())
    }

    async fn update_user(&self, user: &User) -> AppResult<User> {
        let mut inner = self.inner.lock().await;
        if inner.user_by_name(&user.name).is_some_and(|u| u.id != user.id) {
            return Err(AppError::Conflict(format!("User '{}'", user.name)));
        }

        let stored = inner
            .users
            .rows
            .get_mut(&user.id)
            .filter(|u| u.status.is_active())
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        stored.name = user.name.clone();
        stored.password_hash = user.password_hash.clone();
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }

    async fn tombstone_user(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.users.tombstone(id))
    }

    async fn list_users(&self, page: PageRequest) -> AppResult<Vec<User>> {
        let inner = self.inner.lock().await;
        Ok(paginate(inner.users.active_rows().cloned(), page))
    }

    async fn count_users(&self) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.users.active_rows().count() as u64)
    }

    async fn create_group_with_admin(
        &self,
        creator_id: i64,
        input: &CreateGroup,
    ) -> AppResult<(Group, Membership)> {
        let mut inner = self.inner.lock().await;
        let now = OffsetDateTime::now_utc();
        let id = inner.groups.next_id();
        let group = inner.groups.insert(
            id,
            Group {
                id,
                name: input.name.clone(),
                description: input.description.clone(),
                owner_id: creator_id,
                creator_id,
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            },
        );
        let membership =
            inner.insert_membership(Subject::Group(group.id), creator_id, Role::ADMINISTRATOR);

        Ok((group, membership))
    }

    async fn find_group(&self, id: i64) -> AppResult<Option<Group>> {
        let inner = self.inner.lock().await;
        Ok(inner.groups.active(id))
    }

    async fn update_group(&self, group: &Group) -> AppResult<Group> {
        let mut inner = self.inner.lock().await;
        let stored = inner
            .groups
            .rows
            .get_mut(&group.id)
            .filter(|g| g.status.is_active())
            .ok_or_else(|| AppError::NotFound("Group".to_string()))?;
        stored.name = group.name.clone();
        stored.description = group.description.clone();
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }

    async fn tombstone_group(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.groups.tombstone(id))
    }

    async fn list_groups(&self, page: PageRequest) -> AppResult<Vec<Group>> {
        let inner = self.inner.lock().await;
        Ok(paginate(inner.groups.active_rows().cloned(), page))
    }

    async fn count_groups(&self) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.groups.active_rows().count() as u64)
    }

    async fn create_project_with_admin(
        &self,
        creator_id: i64,
        input: &CreateProject,
    ) -> AppResult<(Project, Membership)> {
        let mut inner = self.inner.lock().await;
        if inner.project_by_name(&input.name).is_some() {
            return Err(AppError::Conflict(format!("Project '{}'", input.name)));
        }

        let now = OffsetDateTime::now_utc();
        let id = inner.projects.next_id();
        let project = inner.projects.insert(
            id,
            Project {
                id,
                name: input.name.clone(),
                zh_name: input.zh_name.clone(),
                description: input.description.clone(),
                owner_id: creator_id,
                creator_id,
                group_id: input.group_id,
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            },
        );
        let membership =
            inner.insert_membership(Subject::Project(project.id), creator_id, Role::ADMINISTRATOR);

        Ok((project, membership))
    }

    async fn find_project(&self, id: i64) -> AppResult<Option<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner.projects.active(id))
    }

    async fn find_project_by_name(&self, name: &str) -> AppResult<Option<Project>> {
        let inner = self.inner.lock().await;
        Ok(inner.project_by_name(name).cloned())
    }

    async fn update_project(&self, project: &Project) -> AppResult<Project> {
        let mut inner = self.inner.lock().await;
        if inner
            .project_by_name(&project.name)
            .is_some_and(|p| p.id != project.id)
        {
            return Err(AppError::Conflict(format!("Project '{}'", project.name)));
        }

        let stored = inner
            .projects
            .rows
            .get_mut(&project.id)
            .filter(|p| p.status.is_active())
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;
        stored.name = project.name.clone();
        stored.zh_name = project.zh_name.clone();
        stored.description = project.description.clone();
        stored.group_id = project.group_id;
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }

    async fn tombstone_project(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.projects.tombstone(id))
    }

    async fn list_projects(
        &self,
        filter: ProjectFilter,
        page: PageRequest,
    ) -> AppResult<Vec<Project>> {
        let inner = self.inner.lock().await;
        let rows = inner
            .projects
            .active_rows()
            .filter(|p| filter.group_id.is_none() || p.group_id == filter.group_id)
            .cloned();
        Ok(paginate(rows, page))
    }

    async fn count_projects(&self, filter: ProjectFilter) -> AppResult<u64> {
        let inner = self.inner.lock().await;
        let count = inner
            .projects
            .active_rows()
            .filter(|p| filter.group_id.is_none() || p.group_id == filter.group_id)
            .count();
        Ok(count as u64)
    }

    async fn upsert_membership(
        &self,
        subject: Subject,
        user_id: i64,
        role: Role,
    ) -> AppResult<Membership> {
        let mut inner = self.inner.lock().await;
        let mut existing = inner.memberships_for(subject, user_id).into_iter();

        let Some(first) = existing.next() else {
            return Ok(inner.insert_membership(subject, user_id, role));
        };

        for duplicate in existing {
            inner.memberships.tombstone(duplicate.id);
        }

        let stored = inner
            .memberships
            .rows
            .get_mut(&first.id)
            .ok_or_else(|| AppError::Internal("membership vanished under lock".to_string()))?;
        if stored.role != role {
            stored.role = role;
            stored.updated_at = OffsetDateTime::now_utc();
        }
        Ok(stored.clone())
    }

    async fn find_memberships(
        &self,
        subject: Subject,
        user_id: i64,
    ) -> AppResult<Vec<Membership>> {
        let inner = self.inner.lock().await;
        Ok(inner.memberships_for(subject, user_id))
    }

    async fn tombstone_memberships(&self, subject: Subject, user_id: i64) -> AppResult<u64> {
        let mut inner = self.inner.lock().await;
        let ids: Vec<i64> = inner
            .memberships_for(subject, user_id)
            .iter()
            .map(|m| m.id)
            .collect();

        for id in &ids {
            inner.memberships.tombstone(*id);
        }
        Ok(ids.len() as u64)
    }

    async fn list_members(&self, subject: Subject) -> AppResult<Vec<Member>> {
        let inner = self.inner.lock().await;
        let members = inner
            .memberships
            .active_rows()
            .filter(|m| m.subject() == subject)
            .map(|m| Member {
                membership: m.clone(),
                user: inner.users.active(m.user_id).as_ref().map(UserSummary::from),
            })
            .collect();
        Ok(members)
    }

    async fn create_environment(
        &self,
        project_id: i64,
        creator_id: i64,
        input: &CreateEnvironment,
    ) -> AppResult<Environment> {
        let mut inner = self.inner.lock().await;
        let now = OffsetDateTime::now_utc();
        let id = inner.environments.next_id();
        Ok(inner.environments.insert(
            id,
            Environment {
                id,
                project_id,
                name: input.name.clone(),
                kind: input.kind,
                creator_id,
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            },
        ))
    }

    async fn find_environment(&self, id: i64) -> AppResult<Option<Environment>> {
        let inner = self.inner.lock().await;
        Ok(inner.environments.active(id))
    }

    async fn list_environments(&self, project_id: i64) -> AppResult<Vec<Environment>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .environments
            .active_rows()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn tombstone_environment(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.environments.tombstone(id))
    }

    async fn create_domain(&self, project_id: i64, input: &CreateDomain) -> AppResult<Domain> {
        let mut inner = self.inner.lock().await;
        let now = OffsetDateTime::now_utc();
        let id = inner.domains.next_id();
        Ok(inner.domains.insert(
            id,
            Domain {
                id,
                project_id,
                environment_id: input.environment_id,
                host: input.host.clone(),
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            },
        ))
    }

    async fn find_domain(&self, id: i64) -> AppResult<Option<Domain>> {
        let inner = self.inner.lock().await;
        Ok(inner.domains.active(id))
    }

    async fn list_domains(&self, project_id: i64) -> AppResult<Vec<Domain>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .domains
            .active_rows()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn tombstone_domain(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.domains.tombstone(id))
    }

    async fn create_deployment(
        &self,
        project_id: i64,
        actor_id: i64,
        input: &CreateDeployment,
    ) -> AppResult<Deployment> {
        let mut inner = self.inner.lock().await;
        let now = OffsetDateTime::now_utc();
        let id = inner.deployments.next_id();
        Ok(inner.deployments.insert(
            id,
            Deployment {
                id,
                project_id,
                environment_id: input.environment_id,
                remark: input.remark.clone(),
                target_kind: input.target_kind,
                target_value: input.target_value.clone(),
                creator_id: actor_id,
                last_actor_id: actor_id,
                is_active: None,
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            },
        ))
    }

    async fn find_deployment(&self, id: i64) -> AppResult<Option<Deployment>> {
        let inner = self.inner.lock().await;
        Ok(inner.deployments.active(id))
    }

    async fn list_deployments(
        &self,
        project_id: i64,
        filter: DeploymentFilter,
    ) -> AppResult<Vec<Deployment>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .deployments
            .active_rows()
            .filter(|d| d.project_id == project_id)
            .filter(|d| filter.environment_id.map_or(true, |env| d.environment_id == env))
            .cloned()
            .collect())
    }

    async fn tombstone_deployment(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.deployments.tombstone(id))
    }
}
