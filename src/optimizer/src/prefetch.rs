//! Speculative warm-up: fire a loader for a key in the background and let
//! the caller move on, so a later `ReadThroughCache::get` finds it warm.

use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::cache::ReadThroughCache;

/// Schedules `loader` to run on the tokio executor and populate `cache` with
/// its result. Errors are logged and dropped — prefetch is best-effort, a
/// cache miss later just falls back to the normal read-through path.
pub fn prefetch<K, V, F, Fut, E>(cache: Arc<ReadThroughCache<K, V>>, key: K, loader: F)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<V, E>> + Send,
    E: std::fmt::Display,
{
    tokio::spawn(async move {
        match loader().await {
            Ok(value) => cache.put(key, value).await,
            Err(err) => debug!(%err, "prefetch loader failed, leaving cache cold"),
        }
    });
}

/// Prefetches a batch of keys, each against its own loader, without waiting
/// for any of them to finish.
pub fn prefetch_many<K, V, F, Fut, E>(cache: Arc<ReadThroughCache<K, V>>, keyed_loaders: Vec<(K, F)>)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<V, E>> + Send,
    E: std::fmt::Display,
{
    for (key, loader) in keyed_loaders {
        prefetch(cache.clone(), key, loader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn prefetch_warms_the_cache() {
        let cache = Arc::new(ReadThroughCache::<&str, i32>::new(4, Duration::from_secs(60)));
        prefetch(cache.clone(), "a", || async { Ok::<i32, String>(7) });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&"a").await, Some(7));
    }

    #[tokio::test]
    async fn failed_prefetch_leaves_cache_cold() {
        let cache = Arc::new(ReadThroughCache::<&str, i32>::new(4, Duration::from_secs(60)));
        prefetch(cache.clone(), "a", || async { Err::<i32, String>("boom".into()) });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&"a").await, None);
    }
}
