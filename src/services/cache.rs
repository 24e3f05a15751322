//! Generic in-memory TTL cache
//!
//! Backing store for the response cache middleware. Entries expire after a
//! per-cache TTL; a background task sweeps expired entries and inserts evict
//! the oldest entries when the cache is full.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe cache with a fixed TTL and capacity bound
pub struct Cache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Look up a key, treating expired entries as absent.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Insert or replace an entry with a fresh timestamp.
    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            Self::make_room(&mut entries, self.ttl);
        }
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop expired entries; when none are expired, drop the oldest one.
    fn make_room(entries: &mut HashMap<K, CacheEntry<V>>, ttl: Duration) {
        let before = entries.len();
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        if entries.len() < before {
            return;
        }
        if let Some(oldest) = entries
            .iter()
            .min_by_key(|(_, e)| e.inserted_at)
            .map(|(k, _)| k.clone())
        {
            entries.remove(&oldest);
        }
    }

    /// Remove all expired entries. Called by the background sweep task.
    pub async fn evict_expired(&self) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.inserted_at.elapsed() < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = entries.len(), "evicted expired cache entries");
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Spawn a periodic eviction task for a shared cache.
pub fn spawn_cache_eviction<K, V>(cache: Arc<Cache<K, V>>, interval: Duration)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            cache.evict_expired().await;
        }
    });
}
