use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::group::{self, ActiveModel, Column, Entity as GroupEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateGroup, Group, RecordStatus};
use crate::repositories::Repository;

/// Group repository for database operations
pub struct GroupRepository;

#[async_trait]
impl Repository<Group> for GroupRepository {
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<Group>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = GroupEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync,
    {
        let Some(model) = GroupEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
        else {
            return Ok(false);
        };

        let mut active: ActiveModel = model.into();
        active.status = Set(RecordStatus::Tombstoned);
        active.updated_at = Set(time::OffsetDateTime::now_utc());
        active.update(db).await?;

        Ok(true)
    }
}

impl GroupRepository {
    /// Create a new group owned and created by `creator_id`
    pub async fn create<C>(db: &C, creator_id: i64, input: &CreateGroup) -> AppResult<Group>
    where
        C: ConnectionTrait + Sync,
    {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            owner_id: Set(creator_id),
            creator_id: Set(creator_id),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    /// Write back the mutable fields of a group
    pub async fn update<C>(db: &C, group: &Group) -> AppResult<Group>
    where
        C: ConnectionTrait + Sync,
    {
        let model = GroupEntity::find_by_id(group.id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Group".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.name = Set(group.name.clone());
        active.description = Set(group.description.clone());
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active.update(db).await?;
        Ok(result.into())
    }

    /// List active groups in creation order
    pub async fn list<C>(db: &C, limit: u64, offset: u64) -> AppResult<Vec<Group>>
    where
        C: ConnectionTrait + Sync,
    {
        let models = GroupEntity::find()
            .filter(Column::Status.eq(RecordStatus::Active))
            .order_by_asc(Column::Id)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    pub async fn count<C>(db: &C) -> AppResult<u64>
    where
        C: ConnectionTrait + Sync,
    {
        let count = GroupEntity::find()
            .filter(Column::Status.eq(RecordStatus::Active))
            .count(db)
            .await?;
        Ok(count)
    }
}

// Conversion from SeaORM model to our domain model
impl From<group::Model> for Group {
    fn from(m: group::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            owner_id: m.owner_id,
            creator_id: m.creator_id,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
