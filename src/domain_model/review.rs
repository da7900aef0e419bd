use crate::domain_model::{EntityId, EntityRef, InteractionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTarget {
    Lecturer,
    Subject,
}

impl ReviewTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewTarget::Lecturer => "lecturer",
            ReviewTarget::Subject => "subject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub target_type: ReviewTarget,
    pub target_id: String,
    pub content: String,
    pub rating: u8,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub bookmark_count: u32,
    #[serde(default)]
    pub is_bookmarked: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn entity(&self) -> EntityRef {
        EntityRef::review(self.id.clone())
    }

    pub fn like_state(&self) -> InteractionState {
        InteractionState::new(self.is_liked, self.like_count)
    }

    pub fn bookmark_state(&self) -> InteractionState {
        InteractionState::new(self.is_bookmarked, self.bookmark_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total: u64,
}
