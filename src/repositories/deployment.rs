use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::deployment::{self, ActiveModel, Column, Entity as DeploymentEntity};
use crate::error::AppResult;
use crate::models::{CreateDeployment, Deployment, DeploymentFilter, RecordStatus, TargetKind};
use crate::repositories::Repository;

/// Deployment repository for database operations
pub struct DeploymentRepository;

#[async_trait]
impl Repository<Deployment> for DeploymentRepository {
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<Deployment>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = DeploymentEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync,
    {
        let Some(model) = DeploymentEntity::find_by_id(id)
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

impl DeploymentRepository {
    /// Record a deployment target; creator and last actor are the same caller
    pub async fn create<C>(
        db: &C,
        project_id: i64,
        actor_id: i64,
        input: &CreateDeployment,
    ) -> AppResult<Deployment>
    where
        C: ConnectionTrait + Sync,
    {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            project_id: Set(project_id),
            environment_id: Set(input.environment_id),
            remark: Set(input.remark.clone()),
            target_kind: Set(input.target_kind.get()),
            target_value: Set(input.target_value.clone()),
            creator_id: Set(actor_id),
            last_actor_id: Set(actor_id),
            is_active: Set(None),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(db).await?;
        Ok(result.into())
    }

    /// List active deployments for a project, optionally narrowed to one environment
    pub async fn list_by_project<C>(
        db: &C,
        project_id: i64,
        filter: DeploymentFilter,
    ) -> AppResult<Vec<Deployment>>
    where
        C: ConnectionTrait + Sync,
    {
        let mut query = DeploymentEntity::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Status.eq(RecordStatus::Active));
        if let Some(environment_id) = filter.environment_id {
            query = query.filter(Column::EnvironmentId.eq(environment_id));
        }

        let models = query.order_by_asc(Column::Id).all(db).await?;
        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}

// Conversion from SeaORM model to our domain model
impl From<deployment::Model> for Deployment {
    fn from(m: deployment::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            environment_id: m.environment_id,
            remark: m.remark,
            target_kind: TargetKind::from_stored(m.target_kind),
            target_value: m.target_value,
            creator_id: m.creator_id,
            last_actor_id: m.last_actor_id,
            is_active: m.is_active,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
