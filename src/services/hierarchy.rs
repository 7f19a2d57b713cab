//! Groups and projects: creation with creator enrollment, partial updates,
//! tombstoning and paginated listing.

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateGroup, CreateProject, Group, Identity, Page, PageRequest, Patch, Project, ProjectFilter,
    Role, Subject, UpdateGroup, UpdateProject,
};
use crate::services::MembershipService;
use crate::store::ResourceStore;

pub struct HierarchyService;

impl HierarchyService {
    /// Create a group owned by the caller, who becomes its administrator
    pub async fn create_group(
        store: &dyn ResourceStore,
        identity: &Identity,
        input: CreateGroup,
    ) -> AppResult<Group> {
        let (group, membership) = store
            .create_group_with_admin(identity.user_id, &input)
            .await?;

        tracing::info!(
            group_id = group.id,
            membership_id = membership.id,
            owner_id = identity.user_id,
            "group created"
        );
        Ok(group)
    }

    pub async fn get_group(store: &dyn ResourceStore, id: i64) -> AppResult<Group> {
        store
            .find_group(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group".to_string()))
    }

    pub async fn update_group(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
        changes: UpdateGroup,
    ) -> AppResult<Group> {
        let mut group = Self::get_group(store, id).await?;
        MembershipService::require_role(store, identity, Subject::Group(id), Role::ADMINISTRATOR)
            .await?;

        changes.apply(&mut group);
        let group = store.update_group(&group).await?;

        tracing::info!(group_id = id, actor_id = identity.user_id, "group updated");
        Ok(group)
    }

    /// Tombstone the group; its projects and memberships are left as they are
    pub async fn delete_group(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
    ) -> AppResult<()> {
        Self::get_group(store, id).await?;
        MembershipService::require_role(store, identity, Subject::Group(id), Role::ADMINISTRATOR)
            .await?;

        if !store.tombstone_group(id).await? {
            return Err(AppError::NotFound("Group".to_string()));
        }

        tracing::info!(group_id = id, actor_id = identity.user_id, "group deleted");
        Ok(())
    }

    pub async fn list_groups(
        store: &dyn ResourceStore,
        page: PageRequest,
    ) -> AppResult<Page<Group>> {
        let items = store.list_groups(page).await?;
        let total = store.count_groups().await?;
        Ok(Page::new(items, total, page))
    }

    /// Create a project owned by the caller, who becomes its administrator.
    ///
    /// When a group is named the caller must belong to it.
    pub async fn create_project(
        store: &dyn ResourceStore,
        identity: &Identity,
        input: CreateProject,
    ) -> AppResult<Project> {
        if store.find_project_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!("Project '{}'", input.name)));
        }
        if let Some(group_id) = input.group_id {
            ensure_group_member(store, identity, group_id).await?;
        }

        let (project, membership) = store
            .create_project_with_admin(identity.user_id, &input)
            .await?;

        tracing::info!(
            project_id = project.id,
            group_id = ?project.group_id,
            membership_id = membership.id,
            owner_id = identity.user_id,
            "project created"
        );
        Ok(project)
    }

    pub async fn get_project(store: &dyn ResourceStore, id: i64) -> AppResult<Project> {
        store
            .find_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))
    }

    pub async fn update_project(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
        changes: UpdateProject,
    ) -> AppResult<Project> {
        let mut project = Self::get_project(store, id).await?;
        MembershipService::require_role(store, identity, Subject::Project(id), Role::ADMINISTRATOR)
            .await?;

        if let Patch::Value(group_id) = changes.group_id {
            if project.group_id != Some(group_id) {
                ensure_group_member(store, identity, group_id).await?;
            }
        }

        changes.apply(&mut project);
        let project = store.update_project(&project).await?;

        tracing::info!(project_id = id, actor_id = identity.user_id, "project updated");
        Ok(project)
    }

    /// Tombstone the project; environments, domains and deployments stay readable
    pub async fn delete_project(
        store: &dyn ResourceStore,
        identity: &Identity,
        id: i64,
    ) -> AppResult<()> {
        Self::get_project(store, id).await?;
        MembershipService::require_role(store, identity, Subject::Project(id), Role::ADMINISTRATOR)
            .await?;

        if !store.tombstone_project(id).await? {
            return Err(AppError::NotFound("Project".to_string()));
        }

        tracing::info!(project_id = id, actor_id = identity.user_id, "project deleted");
        Ok(())
    }

    pub async fn list_projects(
        store: &dyn ResourceStore,
        filter: ProjectFilter,
        page: PageRequest,
    ) -> AppResult<Page<Project>> {
        let items = store.list_projects(filter, page).await?;
        let total = store.count_projects(filter).await?;
        Ok(Page::new(items, total, page))
    }
}

/// A project may only be placed in an active group the caller belongs to
async fn ensure_group_member(
    store: &dyn ResourceStore,
    identity: &Identity,
    group_id: i64,
) -> AppResult<()> {
    if store.find_group(group_id).await?.is_none() {
        return Err(AppError::InvalidReference(format!(
            "group {group_id} does not exist"
        )));
    }

    MembershipService::require_role(store, identity, Subject::Group(group_id), Role::ANY_MEMBER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateUser, User};
    use crate::store::InMemoryStore;

    async fn identity(store: &InMemoryStore, name: &str) -> Identity {
        let user: User = store
            .create_user(
                &CreateUser {
                    name: name.to_string(),
                    password: "secret123".to_string(),
                },
                "hash",
            )
            .await
            .unwrap();
        Identity::new(user.id, user.name)
    }

    fn new_group(name: &str) -> CreateGroup {
        CreateGroup {
            name: name.to_string(),
            description: Some("team space".to_string()),
        }
    }

    fn new_project(name: &str, group_id: Option<i64>) -> CreateProject {
        CreateProject {
            name: name.to_string(),
            zh_name: format!("{name}-zh"),
            description: None,
            group_id,
        }
    }

    #[tokio::test]
    async fn test_create_group_enrolls_creator() {
        let store = InMemoryStore::new();
        let caller = identity(&store, "owner").await;

        let group = HierarchyService::create_group(&store, &caller, new_group("platform"))
            .await
            .unwrap();
        assert_eq!(group.owner_id, caller.user_id);
        assert_eq!(group.creator_id, caller.user_id);

        let members = MembershipService::list_members(&store, Subject::Group(group.id))
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].membership.user_id, caller.user_id);
        assert!(members[0].membership.role.is_administrator());
    }

    #[tokio::test]
    async fn test_duplicate_project_name_conflicts() {
        let store = InMemoryStore::new();
        let first = identity(&store, "first").await;
        let second = identity(&store, "second").await;

        HierarchyService::create_project(&store, &first, new_project("alpha", None))
            .await
            .unwrap();
        let result =
            HierarchyService::create_project(&store, &second, new_project("alpha", None)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        let page = HierarchyService::list_projects(
            &store,
            ProjectFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_project_requires_existing_group() {
        let store = InMemoryStore::new();
        let caller = identity(&store, "owner").await;

        let result = HierarchyService::create_project(
            &store,
            &caller,
            new_project("orphan", Some(42)),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_project_in_group_requires_membership() {
        let store = InMemoryStore::new();
        let owner = identity(&store, "owner").await;
        let outsider = identity(&store, "outsider").await;
        let group = HierarchyService::create_group(&store, &owner, new_group("platform"))
            .await
            .unwrap();

        let result =
            HierarchyService::create_project(&store, &outsider, new_project("web", Some(group.id)))
                .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let project =
            HierarchyService::create_project(&store, &owner, new_project("web", Some(group.id)))
                .await
                .unwrap();
        assert_eq!(project.group_id, Some(group.id));
    }

    #[tokio::test]
    async fn test_partial_group_update() {
        let store = InMemoryStore::new();
        let caller = identity(&store, "owner").await;
        let group = HierarchyService::create_group(&store, &caller, new_group("platform"))
            .await
            .unwrap();

        let cleared = HierarchyService::update_group(
            &store,
            &caller,
            group.id,
            UpdateGroup {
                name: None,
                description: Patch::Null,
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.name, "platform");
        assert_eq!(cleared.description, None);

        let unchanged = HierarchyService::update_group(
            &store,
            &caller,
            group.id,
            UpdateGroup {
                name: Some(String::new()),
                description: Patch::Absent,
            },
        )
        .await
        .unwrap();
        assert_eq!(unchanged.name, "platform");
        assert_eq!(unchanged.description, None);
    }

    #[tokio::test]
    async fn test_only_admin_updates_group() {
        let store = InMemoryStore::new();
        let owner = identity(&store, "owner").await;
        let member = identity(&store, "member").await;
        let group = HierarchyService::create_group(&store, &owner, new_group("platform"))
            .await
            .unwrap();
        MembershipService::add_member(
            &store,
            &owner,
            Subject::Group(group.id),
            member.user_id,
            Role::new(3).unwrap(),
        )
        .await
        .unwrap();

        let result = HierarchyService::update_group(
            &store,
            &member,
            group.id,
            UpdateGroup {
                name: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_tombstoned_group_leaves_children_readable() {
        let store = InMemoryStore::new();
        let caller = identity(&store, "owner").await;
        let group = HierarchyService::create_group(&store, &caller, new_group("platform"))
            .await
            .unwrap();
        let project =
            HierarchyService::create_project(&store, &caller, new_project("web", Some(group.id)))
                .await
                .unwrap();

        HierarchyService::delete_group(&store, &caller, group.id)
            .await
            .unwrap();

        assert!(matches!(
            HierarchyService::get_group(&store, group.id).await,
            Err(AppError::NotFound(_))
        ));
        let project = HierarchyService::get_project(&store, project.id).await.unwrap();
        assert_eq!(project.group_id, Some(group.id));
        let members = MembershipService::list_members(&store, Subject::Group(group.id))
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn test_second_page_in_creation_order() {
        let store = InMemoryStore::new();
        let caller = identity(&store, "owner").await;
        for i in 1..=25 {
            HierarchyService::create_project(
                &store,
                &caller,
                new_project(&format!("p{i:02}"), None),
            )
            .await
            .unwrap();
        }

        let page = HierarchyService::list_projects(
            &store,
            ProjectFilter::default(),
            PageRequest::new(Some(2), Some(10)),
        )
        .await
        .unwrap();

        assert_eq!(page.total, 25);
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        let expected: Vec<String> = (11..=20).map(|i| format!("p{i:02}")).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_rename_rechecks_uniqueness() {
        let store = InMemoryStore::new();
        let caller = identity(&store, "owner").await;
        HierarchyService::create_project(&store, &caller, new_project("alpha", None))
            .await
            .unwrap();
        let beta = HierarchyService::create_project(&store, &caller, new_project("beta", None))
            .await
            .unwrap();

        let result = HierarchyService::update_project(
            &store,
            &caller,
            beta.id,
            UpdateProject {
                name: Some("alpha".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
