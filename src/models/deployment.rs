use serde::Serialize;
use time::OffsetDateTime;

use crate::models::{RecordStatus, TargetKind};

/// Longest accepted deployment target value
pub const TARGET_VALUE_MAX_LEN: usize = 512;

/// One record in an environment's deployment-target history
#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub id: i64,
    pub project_id: i64,
    pub environment_id: i64,
    pub remark: Option<String>,
    pub target_kind: TargetKind,
    pub target_value: String,
    pub creator_id: i64,
    pub last_actor_id: i64,
    /// Advisory only; never transitioned by this service
    pub is_active: Option<bool>,
    pub status: RecordStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateDeployment {
    pub environment_id: i64,
    pub remark: Option<String>,
    pub target_kind: TargetKind,
    pub target_value: String,
}

/// Filter for deployment listings
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentFilter {
    pub environment_id: Option<i64>,
}
