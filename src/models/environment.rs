use serde::Serialize;
use time::OffsetDateTime;

use crate::models::{EnvironmentKind, RecordStatus};

#[derive(Debug, Clone, Serialize)]
pub struct Environment {
    pub id: i64,
    pub project_id: i64,
    pub name: String, // e.g., "dev", "staging", "prod"
    pub kind: EnvironmentKind,
    pub creator_id: i64,
    pub status: RecordStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateEnvironment {
    pub name: String,
    pub kind: EnvironmentKind,
}
