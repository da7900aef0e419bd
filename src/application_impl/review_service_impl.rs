use crate::api::v1::envelope::{decode_data, ensure_success};
use crate::api::v1::routes;
use crate::application_impl::{EndpointToggle, QueryClient, fetch_data};
use crate::application_port::*;
use crate::domain_model::*;
use std::sync::Arc;

pub struct RestReviewService {
    client: Arc<dyn ApiClient>,
    queries: Arc<QueryClient>,
    likes: Arc<dyn ToggleMutations>,
    bookmarks: Arc<dyn ToggleMutations>,
}

impl RestReviewService {
    pub fn new(client: Arc<dyn ApiClient>, queries: Arc<QueryClient>) -> Self {
        let likes = Arc::new(EndpointToggle::new(client.clone(), InteractionKind::Like));
        let bookmarks = Arc::new(EndpointToggle::new(client.clone(), InteractionKind::Bookmark));
        Self {
            client,
            queries,
            likes,
            bookmarks,
        }
    }

    pub fn toggles(&self, kind: InteractionKind) -> Arc<dyn ToggleMutations> {
        match kind {
            InteractionKind::Like => self.likes.clone(),
            InteractionKind::Bookmark => self.bookmarks.clone(),
        }
    }

    fn invalidated_by_writes() -> [QueryKey; 2] {
        [
            QueryKey::new([EntityKind::Review.collection()]),
            QueryKey::new(["bookmarks", EntityKind::Review.collection()]),
        ]
    }

    async fn write<T>(
        &self,
        mutation: MutationRequest,
        decode: fn(&HttpResponse) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let request = routes::mutation_request(&mutation)?;
        let client = self.client.clone();
        let call = async move {
            let response = client.send(request).await?;
            decode(&response)
        };
        self.queries
            .mutate(call, &Self::invalidated_by_writes())
            .await
    }
}

#[async_trait::async_trait]
impl ReviewService for RestReviewService {
    async fn list_reviews(&self, query: &ReviewQuery) -> Result<Page<Review>, ApiError> {
        let mut request = ApiRequest::get(routes::collection(EntityKind::Review))
            .with_query("page", query.page);
        let mut key = QueryKey::new(["reviews", "list"]).child(format!("page={}", query.page));
        if let Some(target_type) = query.target_type {
            request = request.with_query("targetType", target_type.as_str());
            key = key.child(format!("targetType={}", target_type.as_str()));
        }
        if let Some(target_id) = &query.target_id {
            request = request.with_query("targetId", target_id);
            key = key.child(format!("targetId={target_id}"));
        }
        if let Some(search) = &query.search {
            request = request.with_query("search", search);
            key = key.child(format!("search={search}"));
        }
        self.queries
            .read(key, || fetch_data(self.client.clone(), request))
            .await
    }

    async fn get_review(&self, id: &EntityId) -> Result<Review, ApiError> {
        let target = EntityRef::review(id.clone());
        let request = ApiRequest::get(routes::entity(&target));
        self.queries
            .read(QueryKey::entity(&target), || {
                fetch_data(self.client.clone(), request)
            })
            .await
    }

    async fn list_bookmarked_reviews(&self, page: u32) -> Result<Page<Review>, ApiError> {
        let request =
            ApiRequest::get(routes::bookmarks(EntityKind::Review)).with_query("page", page);
        let key = QueryKey::new(["bookmarks", "reviews"]).child(format!("page={page}"));
        self.queries
            .read(key, || fetch_data(self.client.clone(), request))
            .await
    }

    async fn create_review(&self, input: CreateReviewInput) -> Result<Review, ApiError> {
        let payload = serde_json::to_value(&input)?;
        self.write(MutationRequest::create(EntityKind::Review, payload), decode_data)
            .await
    }

    async fn edit_review(&self, id: &EntityId, input: EditReviewInput) -> Result<Review, ApiError> {
        let payload = serde_json::to_value(&input)?;
        let target = EntityRef::review(id.clone());
        self.write(MutationRequest::edit(&target, payload), decode_data)
            .await
    }

    async fn delete_review(&self, id: &EntityId) -> Result<(), ApiError> {
        let target = EntityRef::review(id.clone());
        self.write(MutationRequest::delete(&target), ensure_success)
            .await
    }

    async fn like_review(&self, id: &EntityId) -> Result<(), ApiError> {
        self.likes.activate(&EntityRef::review(id.clone())).await
    }

    async fn unlike_review(&self, id: &EntityId) -> Result<(), ApiError> {
        self.likes.deactivate(&EntityRef::review(id.clone())).await
    }

    async fn bookmark_review(&self, id: &EntityId) -> Result<(), ApiError> {
        self.bookmarks.activate(&EntityRef::review(id.clone())).await
    }

    async fn unbookmark_review(&self, id: &EntityId) -> Result<(), ApiError> {
        self.bookmarks.deactivate(&EntityRef::review(id.clone())).await
    }
}
