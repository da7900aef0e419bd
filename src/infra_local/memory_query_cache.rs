use crate::domain_model::QueryKey;
use crate::domain_port::{CachedValue, QueryCache};
use chrono::Utc;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: DashMap<QueryKey, CachedValue>,
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &QueryKey) -> Option<CachedValue> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: QueryKey, value: serde_json::Value) {
        self.entries.insert(
            key,
            CachedValue {
                value,
                fetched_at: Utc::now(),
            },
        );
    }

    fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.entries.len());
        tracing::debug!(%prefix, removed, "cache invalidated");
        removed
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalidate_drops_only_matching_group() {
        let cache = MemoryQueryCache::new();
        cache.put(QueryKey::from("reviews/list/page=1"), json!([1]));
        cache.put(QueryKey::from("reviews/detail/r1"), json!({ "id": "r1" }));
        cache.put(QueryKey::from("forums/list/page=1"), json!([2]));

        assert_eq!(cache.invalidate_prefix(&QueryKey::from("reviews")), 2);
        assert!(cache.get(&QueryKey::from("reviews/detail/r1")).is_none());
        assert_eq!(
            cache.get(&QueryKey::from("forums/list/page=1")).map(|c| c.value),
            Some(json!([2]))
        );
    }

    #[test]
    fn clear_empties_cache() {
        let cache = MemoryQueryCache::new();
        cache.put(QueryKey::from("me"), json!({}));
        cache.clear();
        assert!(cache.is_empty());
    }
}
