use serde::Serialize;
use time::OffsetDateTime;

use crate::models::{Patch, RecordStatus};

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub zh_name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub creator_id: i64,
    pub group_id: Option<i64>,
    pub status: RecordStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub zh_name: String,
    pub description: Option<String>,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub zh_name: Option<String>,
    pub description: Patch<String>,
    pub group_id: Patch<i64>,
}

impl UpdateProject {
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            project.name = name;
        }
        if let Some(zh_name) = self.zh_name.filter(|n| !n.is_empty()) {
            project.zh_name = zh_name;
        }
        self.description.apply_to(&mut project.description);
        self.group_id.apply_to(&mut project.group_id);
    }
}

/// Filter for project listings
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub group_id: Option<i64>,
}
