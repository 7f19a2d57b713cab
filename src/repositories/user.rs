use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entity::user::{self, ActiveModel, Column, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, RecordStatus, User};
use crate::repositories::{conflict_on_unique, Repository};

/// User repository for database operations
pub struct UserRepository;

// Implement the base Repository trait
#[async_trait]
impl Repository<User> for UserRepository {
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<User>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = UserEntity::find_by_id(id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync,
    {
        let Some(model) = UserEntity::find_by_id(id)
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

// User-specific methods (not in the base trait)
impl UserRepository {
    /// Create a new user; the name must be free among active users
    pub async fn create<C>(db: &C, input: &CreateUser, password_hash: &str) -> AppResult<User>
    where
        C: ConnectionTrait + Sync,
    {
        if Self::find_by_name(db, &input.name).await?.is_some() {
            return Err(AppError::Conflict(format!("User '{}'", input.name)));
        }

        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            name: Set(input.name.clone()),
            password_hash: Set(password_hash.to_string()),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(db)
            .await
            .map_err(|e| conflict_on_unique(e, format!("User '{}'", input.name)))?;

        Ok(result.into())
    }

    /// Find active user by name (for login)
    pub async fn find_by_name<C>(db: &C, name: &str) -> AppResult<Option<User>>
    where
        C: ConnectionTrait + Sync,
    {
        let model = UserEntity::find()
            .filter(Column::Name.eq(name))
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?;

        Ok(model.map(Into::into))
    }

    /// Write back the mutable fields of a user, re-checking name uniqueness
    pub async fn update<C>(db: &C, user: &User) -> AppResult<User>
    where
        C: ConnectionTrait + Sync,
    {
        if let Some(holder) = Self::find_by_name(db, &user.name).await? {
            if holder.id != user.id {
                return Err(AppError::Conflict(format!("User '{}'", user.name)));
            }
        }

        let model = UserEntity::find_by_id(user.id)
            .filter(Column::Status.eq(RecordStatus::Active))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.name = Set(user.name.clone());
        active.password_hash = Set(user.password_hash.clone());
        active.updated_at = Set(time::OffsetDateTime::now_utc());

        let result = active
            .update(db)
            .await
            .map_err(|e| conflict_on_unique(e, format!("User '{}'", user.name)))?;
        Ok(result.into())
    }

    /// List active users in id order
    pub async fn list<C>(db: &C, limit: u64, offset: u64) -> AppResult<Vec<User>>
    where
        C: ConnectionTrait + Sync,
    {
        let models = UserEntity::find()
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
        let count = UserEntity::find()
            .filter(Column::Status.eq(RecordStatus::Active))
            .count(db)
            .await?;
        Ok(count)
    }
}

// Conversion from SeaORM model to our domain model
impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            password_hash: m.password_hash,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
