//! A generic async read-through cache with true LRU eviction and per-entry
//! TTL — Open Question 3's resolution: the source bounded its cache by
//! map-iteration count (undefined eviction order); here capacity eviction
//! is genuinely least-recently-used.

use std::hash::Hash;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::Mutex;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct ReadThroughCache<K: Eq + Hash, V: Clone> {
    inner: Mutex<LruCache<K, Entry<V>>>,
    default_ttl: Duration,
}

impl<K: Eq + Hash + Clone, V: Clone> ReadThroughCache<K, V> {
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = std::num::NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        Self { inner: Mutex::new(LruCache::new(capacity)), default_ttl }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, key: K, value: V) {
        self.put_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut cache = self.inner.lock().await;
        cache.put(key, Entry { value, expires_at: Instant::now() + ttl });
    }

    /// Read-through: on miss, calls `loader` and caches its result.
    pub async fn get_or_load<F, Fut, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }
        let value = loader().await?;
        self.put(key, value.clone()).await;
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evicts_least_recently_used_over_capacity() {
        let cache: ReadThroughCache<&str, i32> = ReadThroughCache::new(2, Duration::from_secs(60));
        cache.put("a", 1).await;
        cache.put("b", 2).await;
        cache.get(&"a").await;
        cache.put("c", 3).await;

        assert!(cache.get(&"a").await.is_some());
        assert!(cache.get(&"b").await.is_none());
        assert!(cache.get(&"c").await.is_some());
    }

    #[tokio::test]
    async fn expired_entry_misses_on_get() {
        let cache: ReadThroughCache<&str, i32> = ReadThroughCache::new(4, Duration::from_millis(10));
        cache.put("a", 1).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get(&"a").await.is_none());
    }

    #[tokio::test]
    async fn get_or_load_caches_on_miss() {
        let cache: ReadThroughCache<&str, i32> = ReadThroughCache::new(4, Duration::from_secs(60));
        let loaded: Result<i32, ()> = cache.get_or_load("a", || async { Ok(42) }).await;
        assert_eq!(loaded, Ok(42));
        assert_eq!(cache.get(&"a").await, Some(42));
    }
}
