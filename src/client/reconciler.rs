//! Periodic resync of optimistic interaction state with the server.

use crate::application_impl::QueryClient;
use crate::application_port::{ApiError, ForumService, ReviewService};
use crate::client::EntityInteractions;
use crate::domain_model::{EntityKind, EntityRef, InteractionState, QueryKey};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Authoritative (like, bookmark) state of an entity.
#[async_trait::async_trait]
pub trait InteractionSource: Send + Sync {
    async fn interaction_states(
        &self,
        target: &EntityRef,
    ) -> Result<(InteractionState, InteractionState), ApiError>;
}

pub struct ServiceInteractionSource {
    reviews: Arc<dyn ReviewService>,
    forums: Arc<dyn ForumService>,
}

impl ServiceInteractionSource {
    pub fn new(reviews: Arc<dyn ReviewService>, forums: Arc<dyn ForumService>) -> Self {
        Self { reviews, forums }
    }
}

#[async_trait::async_trait]
impl InteractionSource for ServiceInteractionSource {
    async fn interaction_states(
        &self,
        target: &EntityRef,
    ) -> Result<(InteractionState, InteractionState), ApiError> {
        match target.kind {
            EntityKind::Review => {
                let review = self.reviews.get_review(&target.id).await?;
                Ok((review.like_state(), review.bookmark_state()))
            }
            EntityKind::Forum => {
                let post = self.forums.get_forum(&target.id).await?;
                Ok((post.like_state(), post.bookmark_state()))
            }
        }
    }
}

pub struct Reconciler {
    queries: Arc<QueryClient>,
    source: Arc<dyn InteractionSource>,
    prefixes: Vec<QueryKey>,
    interval: Duration,
    watched: Mutex<Vec<Weak<EntityInteractions>>>,
    cancellation_token: CancellationToken,
}

impl Reconciler {
    pub fn new(
        queries: Arc<QueryClient>,
        source: Arc<dyn InteractionSource>,
        prefixes: Vec<QueryKey>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            queries,
            source,
            prefixes,
            interval,
            watched: Mutex::new(Vec::new()),
            cancellation_token,
        }
    }

    /// Held weakly; dropping the interactions stops their resync.
    pub fn watch(&self, interactions: &Arc<EntityInteractions>) {
        self.watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(interactions));
    }

    fn live(&self) -> Vec<Arc<EntityInteractions>> {
        let mut watched = self.watched.lock().unwrap_or_else(PoisonError::into_inner);
        watched.retain(|w| w.strong_count() > 0);
        watched.iter().filter_map(Weak::upgrade).collect()
    }

    /// Returns how many entities were overwritten with server state.
    pub async fn tick_once(&self) -> usize {
        for prefix in &self.prefixes {
            self.queries.invalidate(prefix);
        }

        let mut reconciled = 0;
        for interactions in self.live() {
            // a toggle in flight still owns the visible state
            if interactions.has_pending() {
                continue;
            }
            let versions = interactions.versions();
            match self.source.interaction_states(interactions.target()).await {
                Ok((like, bookmark)) => {
                    // a toggle made while reading wins over what was read
                    if interactions.reconcile_if(versions, like, bookmark) {
                        reconciled += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(entity = %interactions.target(), "reconcile read failed: {e}");
                }
            }
        }
        reconciled
    }

    pub async fn run(&self) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Reconciler shutting down...");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    let reconciled = self.tick_once().await;
                    tracing::debug!(reconciled, "reconcile pass");
                }
            }
        }
    }
}
