use crate::domain_model::{EntityId, EntityRef, InteractionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    #[serde(alias = "_id")]
    pub id: EntityId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub comment_count: u32,
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

impl ForumPost {
    pub fn entity(&self) -> EntityRef {
        EntityRef::forum(self.id.clone())
    }

    pub fn like_state(&self) -> InteractionState {
        InteractionState::new(self.is_liked, self.like_count)
    }

    pub fn bookmark_state(&self) -> InteractionState {
        InteractionState::new(self.is_bookmarked, self.bookmark_count)
    }
}
