use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Select,
    Set,
};

use crate::entity::membership::{self, ActiveModel, Column, Entity as MembershipEntity};
use crate::entity::user::Entity as UserEntity;
use crate::error::AppResult;
use crate::models::{Member, Membership, RecordStatus, Role, Subject, UserSummary};
use crate::repositories::{conflict_on_unique, Repository};

/// Membership repository for database operations
pub struct MembershipRepository;

#[async_trait]
impl Repository<Membership> for MembershipRepository {
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<Membership>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = MembershipEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync,
    {
        let Some(model) = MembershipEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
        else {
            return Ok(false);
        };

        Self::tombstone_model(db, model).await?;
        Ok(true)
    }
}

impl MembershipRepository {
    /// Insert a new membership row; `Conflict` when the pair is already enrolled
    pub async fn create<C>(
        db: &C,
        subject: Subject,
        user_id: i64,
        role: Role,
    ) -> AppResult<Membership>
    where
        C: ConnectionTrait + Sync,
    {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            subject_kind: Set(subject.kind()),
            subject_id: Set(subject.id()),
            user_id: Set(user_id),
            role: Set(role.get()),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(db)
            .await
            .map_err(|e| conflict_on_unique(e, format!("Membership of user {user_id}")))?;
        Ok(result.into())
    }

    /// Enroll `user_id` on `subject`, reusing the active membership if there is one.
    ///
    /// The partial unique index allows at most one active row per pair. A
    /// concurrent insert of the same pair surfaces here as `Conflict`.
    pub async fn upsert<C>(
        db: &C,
        subject: Subject,
        user_id: i64,
        role: Role,
    ) -> AppResult<Membership>
    where
        C: ConnectionTrait + Sync,
    {
        let current = Self::for_pair(subject, user_id)
            .order_by_asc(Column::Id)
            .one(db)
            .await?;
        let Some(first) = current else {
            return Self::create(db, subject, user_id, role).await;
        };

        if first.role == role.get() {
            return Ok(first.into());
        }

        let mut active: ActiveModel = first.into();
        active.role = Set(role.get());
        active.updated_at = Set(time::OffsetDateTime::now_utc());
        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// Active memberships of one user on one subject
    pub async fn find_for<C>(db: &C, subject: Subject, user_id: i64) -> AppResult<Vec<Membership>>
    where
        C: ConnectionTrait + Sync,
    {
        let models = Self::for_pair(subject, user_id)
            .order_by_asc(Column::Id)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Tombstone every active membership of the pair; returns how many matched
    pub async fn tombstone_for<C>(db: &C, subject: Subject, user_id: i64) -> AppResult<u64>
    where
        C: ConnectionTrait + Sync,
    {
        let now = time::OffsetDateTime::now_utc();
        let result = MembershipEntity::update_many()
            .set(ActiveModel {
                status: Set(RecordStatus::Tombstoned),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(Column::SubjectKind.eq(subject.kind()))
            .filter(Column::SubjectId.eq(subject.id()))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Status.eq(RecordStatus::Active))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Active members of a subject with user display data, in enrollment order
    pub async fn list_members<C>(db: &C, subject: Subject) -> AppResult<Vec<Member>>
    where
        C: ConnectionTrait + Sync,
    {
        let rows = MembershipEntity::find()
            .filter(Column::SubjectKind.eq(subject.kind()))
            .filter(Column::SubjectId.eq(subject.id()))
            .filter(Column::Status.eq(RecordStatus::Active))
            .order_by_asc(Column::Id)
            .find_also_related(UserEntity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(membership, user)| Member {
                membership: membership.into(),
                user: user
                    .filter(|u| u.status.is_active())
                    .map(|u| UserSummary {
                        id: u.id,
                        name: u.name,
                    }),
            })
            .collect())
    }

    fn for_pair(subject: Subject, user_id: i64) -> Select<MembershipEntity> {
        MembershipEntity::find()
            .filter(Column::SubjectKind.eq(subject.kind()))
            .filter(Column::SubjectId.eq(subject.id()))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Status.eq(RecordStatus::Active))
    }

    async fn tombstone_model<C>(db: &C, model: membership::Model) -> AppResult<()>
    where
        C: ConnectionTrait + Sync,
    {
        let mut active: ActiveModel = model.into();
        active.status = Set(RecordStatus::Tombstoned);
        active.updated_at = Set(time::OffsetDateTime::now_utc());
        active.update(db).await?;
        Ok(())
    }
}

// Conversion from SeaORM model to our domain model
impl From<membership::Model> for Membership {
    fn from(m: membership::Model) -> Self {
        Self {
            id: m.id,
            subject_kind: m.subject_kind,
            subject_id: m.subject_id,
            user_id: m.user_id,
            role: Role::from_stored(m.role),
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
