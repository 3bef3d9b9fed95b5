//! Time-bounded query cache
//!
//! Injected by the caller and shared via `Arc`. Keys are lower-cased queries;
//! each entry is replaced whole on write, so concurrent writers can only cause
//! a redundant upstream fetch. Expired entries are dropped on the next read.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Default lifetime of a cached search while a user is typing
pub const DEFAULT_QUERY_TTL: Duration = Duration::from_secs(60);

/// Entries beyond this count trigger a sweep of expired values on insert
const SWEEP_THRESHOLD: usize = 1000;

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CachedEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// Key→value store with a fixed time-to-live
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: RwLock<HashMap<String, CachedEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Cached value for `query`, if present and still fresh
    pub async fn get(&self, query: &str) -> Option<V> {
        let key = Self::key(query);
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if !entry.is_expired(self.ttl) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&key)
            .is_some_and(|entry| entry.is_expired(self.ttl))
        {
            entries.remove(&key);
            debug!(query = %key, "evicted expired cache entry");
        }
        None
    }

    /// Store `value` for `query`, replacing any previous entry
    pub async fn insert(&self, query: &str, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            Self::key(query),
            CachedEntry {
                value,
                stored_at: Instant::now(),
            },
        );

        if entries.len() > SWEEP_THRESHOLD {
            let ttl = self.ttl;
            entries.retain(|_, entry| !entry.is_expired(ttl));
        }
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, fresh or not yet evicted
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_TTL)
    }
}
