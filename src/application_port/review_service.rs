use crate::application_port::ApiError;
use crate::domain_model::{EntityId, Page, Review, ReviewTarget};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    pub page: u32,
    pub target_type: Option<ReviewTarget>,
    pub target_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub target_type: ReviewTarget,
    pub target_id: String,
    pub content: String,
    pub rating: u8,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReviewInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    async fn list_reviews(&self, query: &ReviewQuery) -> Result<Page<Review>, ApiError>;
    async fn get_review(&self, id: &EntityId) -> Result<Review, ApiError>;
    async fn list_bookmarked_reviews(&self, page: u32) -> Result<Page<Review>, ApiError>;
    async fn create_review(&self, input: CreateReviewInput) -> Result<Review, ApiError>;
    async fn edit_review(&self, id: &EntityId, input: EditReviewInput) -> Result<Review, ApiError>;
    async fn delete_review(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn like_review(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn unlike_review(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn bookmark_review(&self, id: &EntityId) -> Result<(), ApiError>;
    async fn unbookmark_review(&self, id: &EntityId) -> Result<(), ApiError>;
}
