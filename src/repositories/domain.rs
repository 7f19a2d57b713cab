use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::domain::{self, ActiveModel, Column, Entity as DomainEntity};
use crate::error::AppResult;
use crate::models::{CreateDomain, Domain, RecordStatus};
use crate::repositories::Repository;

/// Domain repository for database operations
pub struct DomainRepository;

#[async_trait]
impl Repository<Domain> for DomainRepository {
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<Domain>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = DomainEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync,
    {
        let Some(model) = DomainEntity::find_by_id(id)
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

impl DomainRepository {
    /// Bind a host to an environment; hosts are not unique
    pub async fn create<C>(db: &C, project_id: i64, input: &CreateDomain) -> AppResult<Domain>
    where
        C: ConnectionTrait + Sync,
    {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            project_id: Set(project_id),
            environment_id: Set(input.environment_id),
            host: Set(input.host.clone()),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    /// List active domains for a project
    pub async fn list_by_project<C>(db: &C, project_id: i64) -> AppResult<Vec<Domain>>
    where
        C: ConnectionTrait + Sync,
    {
        let models = DomainEntity::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Status.eq(RecordStatus::Active))
            .order_by_asc(Column::Id)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<domain::Model> for Domain {
    fn from(m: domain::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            environment_id: m.environment_id,
            host: m.host,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
