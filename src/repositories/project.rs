use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use crate::entity::project::{self, ActiveModel, Column, Entity as ProjectEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateProject, Project, ProjectFilter, RecordStatus};
use crate::repositories::{conflict_on_unique, Repository};

/// Project repository for database operations
pub struct ProjectRepository;

#[async_trait]
impl Repository<Project> for ProjectRepository {
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<Project>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = ProjectEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync,
    {
        let Some(model) = ProjectEntity::find_by_id(id)
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

impl ProjectRepository {
    /// Create a new project; the name must be free among active projects
    pub async fn create<C>(db: &C, creator_id: i64, input: &CreateProject) -> AppResult<Project>
    where
        C: ConnectionTrait + Sync,
    {
        if Self::find_by_name(db, &input.name).await?.is_some() {
            return Err(AppError::Conflict(format!("Project '{}'", input.name)));
        }

        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            name: Set(input.name.clone()),
            zh_name: Set(input.zh_name.clone()),
            description: Set(input.description.clone()),
            owner_id: Set(creator_id),
            creator_id: Set(creator_id),
            group_id: Set(input.group_id),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        // The partial unique index catches a concurrent insert that slipped past the check
        let result = model
            .insert(db)
            .await
            .map_err(|e| conflict_on_unique(e, format!("Project '{}'", input.name)))?;
        Ok(result.into())
    }

    /// Find the active project holding `name`
    pub async fn find_by_name<C>(db: &C, name: &str) -> AppResult<Option<Project>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = ProjectEntity::find()
            .filter(Column::Name.eq(name))
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    /// Write back the mutable fields of a project, re-checking name uniqueness
    pub async fn update<C>(db: &C, project: &Project) -> AppResult<Project>
    where
        C: ConnectionTrait + Sync,
    {
        if let Some(holder) = Self::find_by_name(db, &project.name).await? {
            if holder.id != project.id {
                return Err(AppError::Conflict(format!("Project '{}'", project.name)));
            }
        }

        let model = ProjectEntity::find_by_id(project.id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.name = Set(project.name.clone());
        active.zh_name = Set(project.zh_name.clone());
        active.description = Set(project.description.clone());
        active.group_id = Set(project.group_id);
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active
            .update(db)
            .await
            .map_err(|e| conflict_on_unique(e, format!("Project '{}'", project.name)))?;
        Ok(result.into())
    }

    /// List active projects in creation order
    pub async fn list<C>(
        db: &C,
        filter: ProjectFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Project>>
    where
        C: ConnectionTrait + Sync,
    {
        let models = Self::filtered(filter)
            .order_by_asc(Column::Id)
            .offset(offset)
            .limit(limit)
            .all(db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    /// Count active projects matching the same filter as `list`
    pub async fn count<C>(db: &C, filter: ProjectFilter) -> AppResult<u64>
    where
        C: ConnectionTrait + Sync,
    {
        let count = Self::filtered(filter).count(db).await?;
        Ok(count)
    }

    fn filtered(filter: ProjectFilter) -> Select<ProjectEntity> {
        let mut query = ProjectEntity::find().filter(Column::Status.eq(RecordStatus::Active));
        if let Some(group_id) = filter.group_id {
            query = query.filter(Column::GroupId.eq(group_id));
        }
        query
    }
}

// Conversion from SeaORM model to our domain model
impl From<project::Model> for Project {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            zh_name: m.zh_name,
            description: m.description,
            owner_id: m.owner_id,
            creator_id: m.creator_id,
            group_id: m.group_id,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
