use crate::api::v1::envelope::{decode_data, ensure_success};
use crate::api::v1::routes;
use crate::application_impl::{EndpointToggle, QueryClient, fetch_data};
use crate::application_port::*;
use crate::domain_model::*;
use std::sync::Arc;

pub struct RestForumService {
    client: Arc<dyn ApiClient>,
    queries: Arc<QueryClient>,
    likes: Arc<dyn ToggleMutations>,
    bookmarks: Arc<dyn ToggleMutations>,
}

impl RestForumService {
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
            .mutate(call, &[QueryKey::new([EntityKind::Forum.collection()])])
            .await
    }
}

#[async_trait::async_trait]
impl ForumService for RestForumService {
    async fn list_forums(&self, query: &ForumQuery) -> Result<Page<ForumPost>, ApiError> {
        let mut request = ApiRequest::get(routes::collection(EntityKind::Forum))
            .with_query("page", query.page);
        let mut key = QueryKey::new(["forums", "list"]).child(format!("page={}", query.page));
        if let Some(tag) = &query.tag {
            request = request.with_query("tag", tag);
            key = key.child(format!("tag={tag}"));
        }
        if let Some(search) = &query.search {
            request = request.with_query("search", search);
            key = key.child(format!("search={search}"));
        }
        self.queries
            .read(key, || fetch_data(self.client.clone(), request))
            .await
    }

    async fn get_forum(&self, id: &EntityId) -> Result<ForumPost, ApiError> {
        let target = EntityRef::forum(id.clone());
        let request = ApiRequest::get(routes::entity(&target));
        self.queries
            .read(QueryKey::entity(&target), || {
                fetch_data(self.client.clone(), request)
            })
            .await
    }

    async fn create_forum(&self, input: CreateForumInput) -> Result<ForumPost, ApiError> {
        let payload = serde_json::to_value(&input)?;
        self.write(MutationRequest::create(EntityKind::Forum, payload), decode_data)
            .await
    }

    async fn edit_forum(
        &self,
        id: &EntityId,
        input: EditForumInput,
    ) -> Result<ForumPost, ApiError> {
        let payload = serde_json::to_value(&input)?;
        let target = EntityRef::forum(id.clone());
        self.write(MutationRequest::edit(&target, payload), decode_data)
            .await
    }

    async fn delete_forum(&self, id: &EntityId) -> Result<(), ApiError> {
        let target = EntityRef::forum(id.clone());
        self.write(MutationRequest::delete(&target), ensure_success)
            .await
    }

    async fn like_forum(&self, id: &EntityId) -> Result<(), ApiError> {
        self.likes.activate(&EntityRef::forum(id.clone())).await
    }

    async fn unlike_forum(&self, id: &EntityId) -> Result<(), ApiError> {
        self.likes.deactivate(&EntityRef::forum(id.clone())).await
    }

    async fn bookmark_forum(&self, id: &EntityId) -> Result<(), ApiError> {
        self.bookmarks.activate(&EntityRef::forum(id.clone())).await
    }

    async fn unbookmark_forum(&self, id: &EntityId) -> Result<(), ApiError> {
        self.bookmarks.deactivate(&EntityRef::forum(id.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{RefreshCoordinator, ResilientApiClient, SessionEndpoints};
    use crate::infra_http::{FakeAuthRoutes, FakeBackendTransport};
    use crate::infra_local::{MemoryQueryCache, RecordingNavigator};

    fn service() -> (RestForumService, Arc<QueryClient>, Arc<MemoryQueryCache>) {
        let backend = Arc::new(FakeBackendTransport::seeded(FakeAuthRoutes::default()));
        let client = Arc::new(ResilientApiClient::new(
            backend,
            Arc::new(RefreshCoordinator::new()),
            Arc::new(RecordingNavigator::new()),
            SessionEndpoints {
                refresh_path: "/auth/refresh".to_string(),
                login_url: "/login".to_string(),
                skip_refresh_paths: vec![],
            },
        ));
        let cache = Arc::new(MemoryQueryCache::new());
        let queries = Arc::new(QueryClient::new(cache.clone(), None));
        (RestForumService::new(client, queries.clone()), queries, cache)
    }

    #[tokio::test]
    async fn create_drops_forum_reads_only() {
        let (forums, queries, cache) = service();
        let page = forums.list_forums(&ForumQuery::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        // an unrelated cached read
        queries
            .read::<serde_json::Value, _, _>(QueryKey::from("reviews/list/page=1"), || async {
                Ok::<_, ApiError>(serde_json::json!({ "items": [] }))
            })
            .await
            .unwrap();
        assert_eq!(cache.len(), 2);

        let post = forums
            .create_forum(CreateForumInput {
                title: "Past papers".to_string(),
                content: "Sharing last year's finals.".to_string(),
                tags: vec!["exams".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(post.tags, vec!["exams".to_string()]);
        assert_eq!(cache.len(), 1);
        assert_eq!(forums.list_forums(&ForumQuery::default()).await.unwrap().items.len(), 2);
    }

    #[tokio::test]
    async fn failed_delete_keeps_cached_reads() {
        let (forums, _queries, cache) = service();
        forums.list_forums(&ForumQuery::default()).await.unwrap();

        let err = forums.delete_forum(&"missing".into()).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn edit_refreshes_cached_post() {
        let (forums, _queries, cache) = service();
        let id = forums.list_forums(&ForumQuery::default()).await.unwrap().items[0]
            .id
            .clone();
        forums.get_forum(&id).await.unwrap();

        forums
            .edit_forum(
                &id,
                EditForumInput {
                    title: Some("Study group for Compilers (Thursdays)".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cache.is_empty());
        let post = forums.get_forum(&id).await.unwrap();
        assert_eq!(post.title, "Study group for Compilers (Thursdays)");
    }
}
