use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::environment::{self, ActiveModel, Column, Entity as EnvironmentEntity};
use crate::error::AppResult;
use crate::models::{CreateEnvironment, Environment, EnvironmentKind, RecordStatus};
use crate::repositories::Repository;

/// Environment repository for database operations
pub struct EnvironmentRepository;

#[async_trait]
impl Repository<Environment> for EnvironmentRepository {
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<Environment>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = EnvironmentEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync,
    {
        let Some(model) = EnvironmentEntity::find_by_id(id)
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

impl EnvironmentRepository {
    /// Create a new environment under a project
    pub async fn create<C>(
        db: &C,
        project_id: i64,
        creator_id: i64,
        input: &CreateEnvironment,
    ) -> AppResult<Environment>
    where
        C: ConnectionTrait + Sync,
    {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            project_id: Set(project_id),
            name: Set(input.name.clone()),
            kind: Set(input.kind.get()),
            creator_id: Set(creator_id),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    /// List active environments for a project
    pub async fn list_by_project<C>(db: &C, project_id: i64) -> AppResult<Vec<Environment>>
    where
        C: ConnectionTrait + Sync,
    {
        let models = EnvironmentEntity::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Status.eq(RecordStatus::Active))
            .order_by_asc(Column::Id)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<environment::Model> for Environment {
    fn from(m: environment::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            name: m.name,
            kind: EnvironmentKind::from_stored(m.kind),
            creator_id: m.creator_id,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
