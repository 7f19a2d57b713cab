//! Small bounded ordinals used across the resource model.
//!
//! Only two meanings are fixed: role `1` is the administrator role granted to
//! creators, and a lower role ordinal is at least as privileged as a higher
//! one. Environment and target kinds are opaque classifications.

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Membership role, `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Role(i16);

impl Role {
    pub const ADMINISTRATOR: Role = Role(1);
    /// Least privileged role; any active membership satisfies it
    pub const ANY_MEMBER: Role = Role(10);

    pub fn new(value: i16) -> AppResult<Self> {
        if (1..=10).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::Validation(format!(
                "role must be between 1 and 10, got {value}"
            )))
        }
    }

    /// Wrap a value read back from storage, which was validated on the way in
    pub(crate) fn from_stored(value: i16) -> Self {
        Self(value)
    }

    pub fn get(self) -> i16 {
        self.0
    }

    pub fn is_administrator(self) -> bool {
        self == Self::ADMINISTRATOR
    }

    /// True when this role is at least as privileged as `threshold`
    pub fn satisfies(self, threshold: Role) -> bool {
        self.0 <= threshold.0
    }
}

/// Environment classification, `1..=4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EnvironmentKind(i16);

impl EnvironmentKind {
    pub fn new(value: i16) -> AppResult<Self> {
        if (1..=4).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::Validation(format!(
                "environment kind must be between 1 and 4, got {value}"
            )))
        }
    }

    pub(crate) fn from_stored(value: i16) -> Self {
        Self(value)
    }

    pub fn get(self) -> i16 {
        self.0
    }
}

/// Deployment target classification, `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetKind(i16);

impl TargetKind {
    pub fn new(value: i16) -> AppResult<Self> {
        if (1..=10).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::Validation(format!(
                "target kind must be between 1 and 10, got {value}"
            )))
        }
    }

    pub(crate) fn from_stored(value: i16) -> Self {
        Self(value)
    }

    pub fn get(self) -> i16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_bounds() {
        assert!(Role::new(0).is_err());
        assert!(Role::new(11).is_err());
        assert!(Role::new(1).unwrap().is_administrator());
        assert_eq!(Role::new(7).unwrap().get(), 7);
    }

    #[test]
    fn test_role_satisfies_threshold() {
        let admin = Role::ADMINISTRATOR;
        let viewer = Role::new(5).unwrap();

        assert!(admin.satisfies(Role::ADMINISTRATOR));
        assert!(admin.satisfies(Role::ANY_MEMBER));
        assert!(viewer.satisfies(Role::ANY_MEMBER));
        assert!(!viewer.satisfies(Role::ADMINISTRATOR));
    }

    #[test]
    fn test_kind_bounds() {
        assert!(EnvironmentKind::new(4).is_ok());
        assert!(EnvironmentKind::new(5).is_err());
        assert!(TargetKind::new(10).is_ok());
        assert!(TargetKind::new(0).is_err());
    }
}
