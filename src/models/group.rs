use serde::Serialize;
use time::OffsetDateTime;

use crate::models::{Patch, RecordStatus};

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub creator_id: i64,
    pub status: RecordStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateGroup {
    /// Empty string is treated as absent
    pub name: Option<String>,
    pub description: Patch<String>,
}

impl UpdateGroup {
    /// Apply the supplied fields onto `group`, leaving the rest untouched
    pub fn apply(self, group: &mut Group) {
        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            group.name = name;
        }
        self.description.apply_to(&mut group.description);
    }
}
