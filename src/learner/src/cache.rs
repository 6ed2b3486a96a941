//! Two-level operation cache (§4.5). L1 is an in-process, single-writer
//! bounded map; L2 is an external key-value store reached through a narrow
//! trait so this crate never depends on a concrete cache client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rtc_types::CachedOperation;
use tokio::sync::RwLock;

use crate::error::LearnerError;

const L1_CAPACITY: usize = 1000;
const L1_TTL_SECONDS: i64 = 300;

/// The `CacheService` capability, narrowed to what the operation cache
/// needs: raw bytes in, raw bytes out, TTL on write.
#[async_trait]
pub trait ExternalCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LearnerError>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), LearnerError>;
}

/// TTL derived from score, doubled past a hit-count threshold, capped at 48h.
pub fn ttl_for(score: i64, hit_count: u64) -> Duration {
    let base_hours: i64 = if score > 500 {
        24
    } else if score > 200 {
        6
    } else if score > 100 {
        2
    } else {
        1
    };
    let hours = if hit_count > 10 {
        base_hours * 2
    } else {
        base_hours
    };
    Duration::from_secs((hours.min(48) * 3600) as u64)
}

struct L1Entry {
    operation: CachedOperation,
}

pub struct OperationCache<L2: ExternalCache> {
    l1: RwLock<HashMap<String, L1Entry>>,
    l2: L2,
}

impl<L2: ExternalCache> OperationCache<L2> {
    pub fn new(l2: L2) -> Self {
        Self {
            l1: RwLock::new(HashMap::new()),
            l2,
        }
    }

    /// L1 → L2 (promote on hit) → miss.
    pub async fn get(&self, key: &str) -> Option<CachedOperation> {
        {
            let mut l1 = self.l1.write().await;
            if let Some(entry) = l1.get_mut(key) {
                if fresh(&entry.operation) {
                    entry.operation.record_hit();
                    return Some(entry.operation.clone());
                }
                l1.remove(key);
            }
        }

        match self.l2.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<CachedOperation>(&bytes) {
                Ok(mut op) => {
                    op.record_hit();
                    self.promote(key, op.clone()).await;
                    Some(op)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt L2 cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "L2 cache read failed");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, operation: CachedOperation) {
        self.promote(key, operation.clone()).await;
        let ttl = ttl_for(operation.score, operation.hit_count);
        if let Ok(bytes) = serde_json::to_vec(&operation) {
            if let Err(e) = self.l2.set(key, bytes, ttl).await {
                tracing::warn!(error = %e, "L2 cache write failed");
            }
        }
    }

    async fn promote(&self, key: &str, operation: CachedOperation) {
        let mut l1 = self.l1.write().await;
        if l1.len() >= L1_CAPACITY && !l1.contains_key(key) {
            evict_oldest(&mut l1);
        }
        l1.insert(key.to_string(), L1Entry { operation });
    }
}

fn fresh(op: &CachedOperation) -> bool {
    (Utc::now() - op.resolved_at).num_seconds() < L1_TTL_SECONDS
}

fn evict_oldest(l1: &mut HashMap<String, L1Entry>) {
    if let Some(oldest_key) = l1
        .iter()
        .min_by_key(|(_, e)| e.operation.resolved_at)
        .map(|(k, _)| k.clone())
    {
        l1.remove(&oldest_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryL2 {
        store: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl ExternalCache for InMemoryL2 {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LearnerError> {
            Ok(self.store.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) -> Result<(), LearnerError> {
            self.store.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips_through_l1() {
        let cache = OperationCache::new(InMemoryL2::default());
        let op = CachedOperation::new("repos/get", "/repos/{owner}/{repo}", "GET", "abc123", 5, 300);
        cache.set("op_cache:github:get:abc123", op.clone()).await;

        let fetched = cache.get("op_cache:github:get:abc123").await.unwrap();
        assert_eq!(fetched.operation_id, op.operation_id);
        assert_eq!(fetched.hit_count, 1);
    }

    #[tokio::test]
    async fn miss_falls_through_to_l2() {
        let l2 = InMemoryL2::default();
        let op = CachedOperation::new("repos/get", "/repos/{owner}/{repo}", "GET", "abc123", 5, 300);
        l2.set("k", serde_json::to_vec(&op).unwrap(), Duration::from_secs(60))
            .await
            .unwrap();

        let cache = OperationCache::new(l2);
        let fetched = cache.get("k").await;
        assert!(fetched.is_some());
    }

    #[test]
    fn ttl_scales_with_score_and_hit_count() {
        assert_eq!(ttl_for(600, 0), Duration::from_secs(24 * 3600));
        assert_eq!(ttl_for(600, 11), Duration::from_secs(48 * 3600));
        assert_eq!(ttl_for(50, 0), Duration::from_secs(3600));
    }
}
