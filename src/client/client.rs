use crate::application_impl::*;
use crate::application_port::*;
use crate::client::{EntityInteractions, Reconciler, ServiceInteractionSource};
use crate::domain_model::{ForumPost, InteractionKind, QueryKey, Review};
use crate::domain_port::*;
use crate::infra_http::*;
use crate::infra_local::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Toggles {
    likes: Arc<dyn ToggleMutations>,
    bookmarks: Arc<dyn ToggleMutations>,
}

pub struct Client {
    pub api_client: Arc<dyn ApiClient>,
    pub session_service: Arc<dyn SessionService>,
    pub review_service: Arc<dyn ReviewService>,
    pub forum_service: Arc<dyn ForumService>,
    pub queries: Arc<QueryClient>,
    coordinator: Arc<RefreshCoordinator>,
    review_toggles: Toggles,
    forum_toggles: Toggles,
    fake_backend: Option<Arc<FakeBackendTransport>>,
    reconciler: Option<Arc<Reconciler>>,
    reconciler_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Client {
    /// Must be called inside a tokio runtime when reconciling is enabled.
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let mut fake_backend = None;
        let transport: Arc<dyn HttpTransport> = match settings.transport.backend.as_str() {
            "fake" => {
                let backend = Arc::new(FakeBackendTransport::seeded(FakeAuthRoutes {
                    login_path: settings.session.login_path.clone(),
                    refresh_path: settings.session.refresh_path.clone(),
                    logout_path: settings.session.logout_path.clone(),
                    me_path: settings.session.me_path.clone(),
                }));
                fake_backend = Some(backend.clone());
                backend
            }
            "real" => Arc::new(ReqwestTransport::new(
                &settings.api.base_url,
                settings.api.timeout(),
            )?),
            other => return Err(anyhow::anyhow!("Unknown transport backend: {}", other)),
        };
        Ok(Self::with_transport(settings, transport, Arc::new(LogNavigator), fake_backend))
    }

    pub fn with_transport(
        settings: &Settings,
        transport: Arc<dyn HttpTransport>,
        navigator: Arc<dyn Navigator>,
        fake_backend: Option<Arc<FakeBackendTransport>>,
    ) -> Self {
        let session = &settings.session;
        let coordinator = Arc::new(RefreshCoordinator::default());
        let api_client: Arc<dyn ApiClient> = Arc::new(ResilientApiClient::new(
            transport,
            coordinator.clone(),
            navigator,
            SessionEndpoints {
                refresh_path: session.refresh_path.clone(),
                login_url: session.login_url.clone(),
                skip_refresh_paths: vec![session.login_path.clone(), session.logout_path.clone()],
            },
        ));

        let cache: Arc<dyn QueryCache> = Arc::new(MemoryQueryCache::new());
        let queries = Arc::new(QueryClient::new(cache, settings.cache.stale_after()));

        let reviews = RestReviewService::new(api_client.clone(), queries.clone());
        let review_toggles = Toggles {
            likes: reviews.toggles(InteractionKind::Like),
            bookmarks: reviews.toggles(InteractionKind::Bookmark),
        };
        let forums = RestForumService::new(api_client.clone(), queries.clone());
        let forum_toggles = Toggles {
            likes: forums.toggles(InteractionKind::Like),
            bookmarks: forums.toggles(InteractionKind::Bookmark),
        };
        let review_service: Arc<dyn ReviewService> = Arc::new(reviews);
        let forum_service: Arc<dyn ForumService> = Arc::new(forums);
        let session_service: Arc<dyn SessionService> = Arc::new(RestSessionService::new(
            api_client.clone(),
            queries.clone(),
            coordinator.clone(),
            SessionPaths {
                login_path: session.login_path.clone(),
                logout_path: session.logout_path.clone(),
                me_path: session.me_path.clone(),
            },
        ));

        // region background reconcile
        let cancel = CancellationToken::new();
        let (reconciler, reconciler_handle) = match settings.reconcile.interval() {
            Some(interval) => {
                let reconciler = Arc::new(Reconciler::new(
                    queries.clone(),
                    Arc::new(ServiceInteractionSource::new(
                        review_service.clone(),
                        forum_service.clone(),
                    )),
                    settings
                        .reconcile
                        .prefixes
                        .iter()
                        .map(|p| QueryKey::from(p.as_str()))
                        .collect(),
                    interval,
                    cancel.clone(),
                ));
                let task = reconciler.clone();
                let handle = tokio::spawn(async move { task.run().await });
                (Some(reconciler), Some(handle))
            }
            None => (None, None),
        };
        // endregion

        info!(backend = %settings.transport.backend, "client started");

        Self {
            api_client,
            session_service,
            review_service,
            forum_service,
            queries,
            coordinator,
            review_toggles,
            forum_toggles,
            fake_backend,
            reconciler,
            reconciler_handle: Mutex::new(reconciler_handle),
            cancel,
        }
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// The in-memory backend when `transport.backend = "fake"`.
    pub fn fake_backend(&self) -> Option<&Arc<FakeBackendTransport>> {
        self.fake_backend.as_ref()
    }

    pub fn review_interactions(&self, review: &Review) -> Arc<EntityInteractions> {
        let interactions = Arc::new(EntityInteractions::for_review(
            review,
            self.review_toggles.likes.clone(),
            self.review_toggles.bookmarks.clone(),
        ));
        self.watch(&interactions);
        interactions
    }

    pub fn forum_interactions(&self, post: &ForumPost) -> Arc<EntityInteractions> {
        let interactions = Arc::new(EntityInteractions::for_forum(
            post,
            self.forum_toggles.likes.clone(),
            self.forum_toggles.bookmarks.clone(),
        ));
        self.watch(&interactions);
        interactions
    }

    fn watch(&self, interactions: &Arc<EntityInteractions>) {
        if let Some(reconciler) = &self.reconciler {
            reconciler.watch(interactions);
        }
    }

    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let handle = match self.reconciler_handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("reconciler task join failed: {e}");
            }
        }

        info!("client shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::ToggleOutcome;
    use crate::domain_model::InteractionState;
    use crate::settings::parse_settings;

    fn fake_settings() -> Settings {
        let mut settings = parse_settings(Some(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/settings/dev.toml"
        )))
        .unwrap();
        settings.transport.backend = "fake".to_string();
        settings.reconcile.interval_secs = 0;
        settings
    }

    #[tokio::test]
    async fn expired_session_is_renewed_transparently() {
        let client = Client::try_new(&fake_settings()).unwrap();
        let backend = client.fake_backend().unwrap().clone();
        backend.expire_session();

        let page = client
            .review_service
            .list_reviews(&ReviewQuery {
                page: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(backend.refresh_calls(), 1);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn rejected_like_rolls_back() {
        let client = Client::try_new(&fake_settings()).unwrap();
        let backend = client.fake_backend().unwrap().clone();
        let review = client.review_service.get_review(&"r1".into()).await.unwrap();
        backend.fail_toggles_for("r1");

        let interactions = client.review_interactions(&review);
        let pending = interactions.toggle(InteractionKind::Like);
        assert_eq!(pending.state, InteractionState::new(true, 13));
        assert!(matches!(pending.settle().await, ToggleOutcome::Reverted { .. }));
        assert_eq!(
            interactions.controller(InteractionKind::Like).state(),
            InteractionState::new(false, 12)
        );
    }

    #[tokio::test]
    async fn confirmed_bookmark_reaches_the_server() {
        let client = Client::try_new(&fake_settings()).unwrap();
        let backend = client.fake_backend().unwrap().clone();
        let page = client.forum_service.list_forums(&ForumQuery::default()).await.unwrap();
        let interactions = client.forum_interactions(&page.items[0]);

        let outcome = interactions.toggle(InteractionKind::Bookmark).settle().await;
        assert_eq!(outcome, ToggleOutcome::Confirmed);
        let stored = backend.entity("forums", page.items[0].id.0.as_str()).unwrap();
        assert_eq!(stored["isBookmarked"], serde_json::json!(true));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut settings = fake_settings();
        settings.transport.backend = "carrier-pigeon".to_string();
        assert!(Client::try_new(&settings).is_err());
    }
}
