use crate::error::{AppError, AppResult};
use crate::models::{Identity, Member, Membership, Role, Subject};
use crate::store::ResourceStore;

/// Role-tagged memberships on groups and projects, and the capability check
/// every mutating operation goes through.
pub struct MembershipService;

impl MembershipService {
    /// Fails with `Forbidden` unless the caller holds an active membership on
    /// `subject` whose role is at least as privileged as `threshold`.
    ///
    /// Returns the most privileged qualifying membership.
    pub async fn require_role(
        store: &dyn ResourceStore,
        identity: &Identity,
        subject: Subject,
        threshold: Role,
    ) -> AppResult<Membership> {
        store
            .find_memberships(subject, identity.user_id)
            .await?
            .into_iter()
            .filter(|m| m.role.satisfies(threshold))
            .min_by_key(|m| m.role)
            .ok_or_else(|| {
                tracing::debug!(
                    user_id = identity.user_id,
                    %subject,
                    threshold = threshold.get(),
                    "capability check failed"
                );
                AppError::Forbidden(format!(
                    "role {} or better required on {}",
                    threshold.get(),
                    subject
                ))
            })
    }

    /// Enroll `user_id` on `subject` with `role`, or change the role of an
    /// existing enrollment. Caller must administer the subject.
    pub async fn add_member(
        store: &dyn ResourceStore,
        identity: &Identity,
        subject: Subject,
        user_id: i64,
        role: Role,
    ) -> AppResult<Membership> {
        ensure_subject_exists(store, subject).await?;
        Self::require_role(store, identity, subject, Role::ADMINISTRATOR).await?;

        if store.find_user(user_id).await?.is_none() {
            return Err(AppError::InvalidReference(format!(
                "user {user_id} does not exist"
            )));
        }

        let membership = store.upsert_membership(subject, user_id, role).await?;
        tracing::info!(
            membership_id = membership.id,
            %subject,
            user_id,
            role = role.get(),
            actor_id = identity.user_id,
            "member added"
        );

        Ok(membership)
    }

    /// Tombstone every active membership of `user_id` on `subject`
    pub async fn remove_member(
        store: &dyn ResourceStore,
        identity: &Identity,
        subject: Subject,
        user_id: i64,
    ) -> AppResult<()> {
        ensure_subject_exists(store, subject).await?;
        Self::require_role(store, identity, subject, Role::ADMINISTRATOR).await?;

        let removed = store.tombstone_memberships(subject, user_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound("Membership".to_string()));
        }

        tracing::info!(
            %subject,
            user_id,
            removed,
            actor_id = identity.user_id,
            "member removed"
        );
        Ok(())
    }

    /// Active members of `subject` in enrollment order
    pub async fn list_members(
        store: &dyn ResourceStore,
        subject: Subject,
    ) -> AppResult<Vec<Member>> {
        store.list_members(subject).await
    }
}

/// `NotFound` unless the group or project is active
pub(crate) async fn ensure_subject_exists(
    store: &dyn ResourceStore,
    subject: Subject,
) -> AppResult<()> {
    let exists = match subject {
        Subject::Group(id) => store.find_group(id).await?.is_some(),
        Subject::Project(id) => store.find_project(id).await?.is_some(),
    };

    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(subject.label().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateGroup, CreateUser, Group};
    use crate::store::InMemoryStore;

    async fn user(store: &InMemoryStore, name: &str) -> Identity {
        let user = store
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

    async fn group(store: &InMemoryStore, owner: &Identity) -> Group {
        let (group, _) = store
            .create_group_with_admin(
                owner.user_id,
                &CreateGroup {
                    name: "platform".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        group
    }

    #[tokio::test]
    async fn test_admin_adds_and_removes_member() {
        let store = InMemoryStore::new();
        let owner = user(&store, "owner").await;
        let guest = user(&store, "guest").await;
        let subject = Subject::Group(group(&store, &owner).await.id);

        let membership = MembershipService::add_member(
            &store,
            &owner,
            subject,
            guest.user_id,
            Role::new(5).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(membership.role.get(), 5);

        let members = MembershipService::list_members(&store, subject).await.unwrap();
        assert_eq!(members.len(), 2);

        MembershipService::remove_member(&store, &owner, subject, guest.user_id)
            .await
            .unwrap();

        let members = MembershipService::list_members(&store, subject).await.unwrap();
        assert!(members.iter().all(|m| m.membership.user_id != guest.user_id));
    }

    #[tokio::test]
    async fn test_adding_twice_changes_role_in_place() {
        let store = InMemoryStore::new();
        let owner = user(&store, "owner").await;
        let guest = user(&store, "guest").await;
        let subject = Subject::Group(group(&store, &owner).await.id);

        let first = MembershipService::add_member(
            &store,
            &owner,
            subject,
            guest.user_id,
            Role::new(8).unwrap(),
        )
        .await
        .unwrap();
        let second = MembershipService::add_member(
            &store,
            &owner,
            subject,
            guest.user_id,
            Role::new(3).unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        let members = MembershipService::list_members(&store, subject).await.unwrap();
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_add_members() {
        let store = InMemoryStore::new();
        let owner = user(&store, "owner").await;
        let member = user(&store, "member").await;
        let outsider = user(&store, "outsider").await;
        let subject = Subject::Group(group(&store, &owner).await.id);

        MembershipService::add_member(
            &store,
            &owner,
            subject,
            member.user_id,
            Role::new(2).unwrap(),
        )
        .await
        .unwrap();

        let result = MembershipService::add_member(
            &store,
            &member,
            subject,
            outsider.user_id,
            Role::ANY_MEMBER,
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_add_member_validates_references() {
        let store = InMemoryStore::new();
        let owner = user(&store, "owner").await;
        let subject = Subject::Group(group(&store, &owner).await.id);

        let missing_user =
            MembershipService::add_member(&store, &owner, subject, 999, Role::ANY_MEMBER).await;
        assert!(matches!(missing_user, Err(AppError::InvalidReference(_))));

        let missing_group = MembershipService::add_member(
            &store,
            &owner,
            Subject::Group(999),
            owner.user_id,
            Role::ANY_MEMBER,
        )
        .await;
        assert!(matches!(missing_group, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_unknown_member_is_not_found() {
        let store = InMemoryStore::new();
        let owner = user(&store, "owner").await;
        let guest = user(&store, "guest").await;
        let subject = Subject::Group(group(&store, &owner).await.id);

        let result = MembershipService::remove_member(&store, &owner, subject, guest.user_id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_require_role_threshold() {
        let store = InMemoryStore::new();
        let owner = user(&store, "owner").await;
        let viewer = user(&store, "viewer").await;
        let subject = Subject::Group(group(&store, &owner).await.id);

        MembershipService::add_member(
            &store,
            &owner,
            subject,
            viewer.user_id,
            Role::new(6).unwrap(),
        )
        .await
        .unwrap();

        assert!(MembershipService::require_role(&store, &viewer, subject, Role::ANY_MEMBER)
            .await
            .is_ok());
        assert!(MembershipService::require_role(&store, &viewer, subject, Role::new(5).unwrap())
            .await
            .is_err());
    }
}
