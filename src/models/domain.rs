use serde::Serialize;
use time::OffsetDateTime;

use crate::models::RecordStatus;

#[derive(Debug, Clone, Serialize)]
pub struct Domain {
    pub id: i64,
    pub project_id: i64,
    pub environment_id: i64,
    pub host: String,
    pub status: RecordStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateDomain {
    pub environment_id: i64,
    pub host: String,
}
