use crate::application_port::ApiError;
use crate::domain_model::{EntityId, ForumPost, Page};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct ForumQuery {
    pub page: u32,
    pub tag: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateForumInput {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditForumInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[async_trait::async_trait]
pub trait ForumService: Send + Sync {
    async fn list_forums(&self, query: &ForumQuery) -> Result<Page<ForumPost>, ApiError>;
    async fn get_forum(&self, id: &EntityId) -> Result<ForumPost, ApiError>;
    async fn create_forum(&self, input: CreateForumInput) -> Result<ForumPost, ApiError>;
    async fn edit_forum(&self, id: &EntityId, input: EditForumInput)
    -> Result<ForumPost, ApiError>;
    async fn delete_forum(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn like_forum(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn unlike_forum(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn bookmark_forum(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn unbookmark_forum(&self, id: &EntityId) -> Result<(), ApiError>;
}
