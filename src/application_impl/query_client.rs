//! Cached reads, mutations that invalidate them, and de-duplication of
//! concurrent reads of the same key: readers arriving while a fetch for
//! their key is in flight share its result instead of issuing another.

use crate::api::v1::envelope::decode_data;
use crate::application_port::{ApiClient, ApiError};
use crate::domain_model::{ApiRequest, QueryKey};
use crate::domain_port::QueryCache;
use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;

type SharedFetch = Shared<BoxFuture<'static, Result<serde_json::Value, ApiError>>>;

pub struct QueryClient {
    cache: Arc<dyn QueryCache>,
    in_flight: DashMap<QueryKey, SharedFetch>,
    stale_after: Option<TimeDelta>,
}

impl QueryClient {
    /// `stale_after` of `None` keeps entries until they are invalidated.
    pub fn new(cache: Arc<dyn QueryCache>, stale_after: Option<TimeDelta>) -> Self {
        Self {
            cache,
            in_flight: DashMap::new(),
            stale_after,
        }
    }

    pub async fn read<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, ApiError>> + Send + 'static,
    {
        if let Some(value) = self.fresh(&key) {
            tracing::trace!(%key, "cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        let (shared, leader) = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let shared = fetch().boxed().shared();
                entry.insert(shared.clone());
                (shared, true)
            }
        };
        if !leader {
            tracing::debug!(%key, "joining in-flight read");
        }

        let result = shared.clone().await;
        let removed = self
            .in_flight
            .remove_if(&key, |_, pending| pending.ptr_eq(&shared))
            .is_some();
        // only the reader whose fetch is still registered may fill the cache;
        // an invalidation in between has already unregistered it
        if leader && removed {
            if let Ok(value) = &result {
                self.cache.put(key, value.clone());
            }
        }
        Ok(serde_json::from_value(result?)?)
    }

    /// Run a mutation; on success drop every cached read under `invalidates`.
    pub async fn mutate<T, Fut>(
        &self,
        mutation: Fut,
        invalidates: &[QueryKey],
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let result = mutation.await;
        if result.is_ok() {
            for prefix in invalidates {
                self.invalidate(prefix);
            }
        }
        result
    }

    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.in_flight.retain(|key, _| !key.starts_with(prefix));
        self.cache.invalidate_prefix(prefix)
    }

    pub fn clear(&self) {
        self.in_flight.clear();
        self.cache.clear();
    }

    fn fresh(&self, key: &QueryKey) -> Option<serde_json::Value> {
        let cached = self.cache.get(key)?;
        match self.stale_after {
            Some(limit) if Utc::now() - cached.fetched_at > limit => None,
            _ => Some(cached.value),
        }
    }
}

/// Fetch for [`QueryClient::read`]: send `request` and unwrap the envelope.
pub fn fetch_data(
    client: Arc<dyn ApiClient>,
    request: ApiRequest,
) -> impl Future<Output = Result<serde_json::Value, ApiError>> + Send + 'static {
    async move {
        let response = client.send(request).await?;
        decode_data(&response)
    }
}
