//! SeaORM repositories, one per table.
//!
//! Every query here filters on `RecordStatus::Active`; tombstoned rows are
//! never returned. Functions are generic over `ConnectionTrait` so the store
//! can run them on a plain connection or inside a transaction.

pub mod deployment;
pub mod domain;
pub mod environment;
pub mod group;
pub mod membership;
pub mod project;
pub mod user;

pub use deployment::DeploymentRepository;
pub use domain::DomainRepository;
pub use environment::EnvironmentRepository;
pub use group::GroupRepository;
pub use membership::MembershipRepository;
pub use project::ProjectRepository;
pub use user::UserRepository;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbErr, SqlErr};

use crate::error::{AppError, AppResult};

/// Base repository trait for operations every table supports
#[async_trait]
pub trait Repository<T>
where
    T: Send + Sync,
{
    /// Find an active entity by ID
    async fn find_active<C>(db: &C, id: i64) -> AppResult<Option<T>>
    where
        C: ConnectionTrait + Sync;

    /// Tombstone an entity by ID; false when no active row matched
    async fn tombstone<C>(db: &C, id: i64) -> AppResult<bool>
    where
        C: ConnectionTrait + Sync;
}

/// Map a unique-index violation to `Conflict`, anything else to a database error
pub(crate) fn conflict_on_unique(err: DbErr, what: impl Into<String>) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(what.into()),
        _ => err.into(),
    }
}
