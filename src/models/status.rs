use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};

/// Lifecycle marker carried by every stored entity.
///
/// Tombstoned rows stay in storage but are invisible to every read, list and
/// count path. There is no transition back to `Active`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    #[sea_orm(num_value = 0)]
    Active,
    #[sea_orm(num_value = 1)]
    Tombstoned,
}

impl RecordStatus {
    pub fn is_active(self) -> bool {
        self == RecordStatus::Active
    }
}
