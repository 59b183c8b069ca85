//! Polymorphic budget owner reference.
//!
//! A budget belongs to exactly one owner: an individual user, a group, or a
//! shared event. The owner rows themselves live outside the ledger core (the
//! account/group/event subsystems); the ledger only stores the tagged pair
//! `(kind, id)` and enforces at most one budget per pair.

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Discriminant for the three owner tables a budget can point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    User,
    Group,
    Event,
}

impl OwnerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Event => "event",
        }
    }
}

impl TryFrom<&str> for OwnerKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            "event" => Ok(Self::Event),
            other => Err(LedgerError::NotFound(format!("owner kind {other}"))),
        }
    }
}

/// Tagged reference to the entity a budget belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerRef {
    User(i64),
    Group(i64),
    Event(i64),
}

impl OwnerRef {
    /// Builds an owner reference from the two stored columns.
    pub fn from_parts(kind: &str, id: i64) -> Result<Self, LedgerError> {
        Ok(Self::new(OwnerKind::try_from(kind)?, id))
    }

    #[must_use]
    pub fn new(kind: OwnerKind, id: i64) -> Self {
        match kind {
            OwnerKind::User => Self::User(id),
            OwnerKind::Group => Self::Group(id),
            OwnerKind::Event => Self::Event(id),
        }
    }

    #[must_use]
    pub fn kind(self) -> OwnerKind {
        match self {
            Self::User(_) => OwnerKind::User,
            Self::Group(_) => OwnerKind::Group,
            Self::Event(_) => OwnerKind::Event,
        }
    }

    #[must_use]
    pub fn owner_id(self) -> i64 {
        match self {
            Self::User(id) | Self::Group(id) | Self::Event(id) => id,
        }
    }
}

impl core::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.owner_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [OwnerKind::User, OwnerKind::Group, OwnerKind::Event] {
            assert_eq!(OwnerKind::try_from(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_not_found() {
        let err = OwnerKind::try_from("wallet").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn from_parts_rebuilds_the_variant() {
        assert_eq!(
            OwnerRef::from_parts("group", 7).unwrap(),
            OwnerRef::Group(7)
        );
        assert_eq!(OwnerRef::Event(3).to_string(), "event:3");
    }
}
