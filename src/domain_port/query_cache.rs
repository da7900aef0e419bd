use crate::domain_model::QueryKey;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    pub value: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}

pub trait QueryCache: Send + Sync {
    fn get(&self, key: &QueryKey) -> Option<CachedValue>;
    fn put(&self, key: QueryKey, value: serde_json::Value);
    /// Drop every entry whose key starts with `prefix`; returns how many went.
    fn invalidate_prefix(&self, prefix: &QueryKey) -> usize;
    fn clear(&self);
}
