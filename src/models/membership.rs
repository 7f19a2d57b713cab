use std::fmt;

use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::{RecordStatus, Role, UserSummary};

/// Discriminant stored alongside `subject_id` in the memberships table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    #[sea_orm(string_value = "group")]
    Group,
    #[sea_orm(string_value = "project")]
    Project,
}

/// The Group or Project a membership applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Group(i64),
    Project(i64),
}

impl Subject {
    pub fn new(kind: SubjectKind, id: i64) -> Self {
        match kind {
            SubjectKind::Group => Subject::Group(id),
            SubjectKind::Project => Subject::Project(id),
        }
    }

    pub fn kind(self) -> SubjectKind {
        match self {
            Subject::Group(_) => SubjectKind::Group,
            Subject::Project(_) => SubjectKind::Project,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Subject::Group(id) | Subject::Project(id) => id,
        }
    }

    /// Resource label used in error messages
    pub fn label(self) -> &'static str {
        match self {
            Subject::Group(_) => "Group",
            Subject::Project(_) => "Project",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label().to_ascii_lowercase(), self.id())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    pub id: i64,
    pub subject_kind: SubjectKind,
    pub subject_id: i64,
    pub user_id: i64,
    pub role: Role,
    pub status: RecordStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Membership {
    pub fn subject(&self) -> Subject {
        Subject::new(self.subject_kind, self.subject_id)
    }
}

/// A membership with the member's display data attached
#[derive(Debug, Clone)]
pub struct Member {
    pub membership: Membership,
    pub user: Option<UserSummary>,
}
