use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId(value.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId(value)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Review,
    Forum,
}

impl EntityKind {
    /// Collection segment used both in REST paths and in cache keys.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Review => "reviews",
            EntityKind::Forum => "forums",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Review => write!(f, "review"),
            EntityKind::Forum => write!(f, "forum"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub fn review(id: impl Into<EntityId>) -> Self {
        Self {
            kind: EntityKind::Review,
            id: id.into(),
        }
    }

    pub fn forum(id: impl Into<EntityId>) -> Self {
        Self {
            kind: EntityKind::Forum,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
