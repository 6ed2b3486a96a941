//! Process-local registry of in-flight execution checkpoints (§3):
//! "Created on admission, destroyed on completion or timeout." Purely a
//! bookkeeping aid for observability — no stage reads back through it, each
//! stage mutates the checkpoint it was handed directly.

use std::collections::HashMap;

use rtc_types::{ExecutionCheckpoint, ExecutionId};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct CheckpointRegistry {
    inner: Mutex<HashMap<ExecutionId, ExecutionCheckpoint>>,
}

impl CheckpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn install(&self, checkpoint: ExecutionCheckpoint) {
        self.inner.lock().await.insert(checkpoint.id, checkpoint);
    }

    pub async fn remove(&self, id: ExecutionId) -> Option<ExecutionCheckpoint> {
        self.inner.lock().await.remove(&id)
    }

    pub async fn snapshot(&self, id: ExecutionId) -> Option<ExecutionCheckpoint> {
        self.inner.lock().await.get(&id).cloned()
    }

    pub async fn active_count(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtc_types::{ExecutionMode, ExecutionRequest};
    use std::collections::HashMap as Map;
    use uuid::Uuid;

    fn request() -> ExecutionRequest {
        ExecutionRequest::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), "get", Map::new(), ExecutionMode::Sync)
    }

    #[tokio::test]
    async fn install_then_remove_round_trips() {
        let registry = CheckpointRegistry::new();
        let checkpoint = ExecutionCheckpoint::new(request());
        let id = checkpoint.id;

        registry.install(checkpoint).await;
        assert_eq!(registry.active_count().await, 1);
        assert!(registry.snapshot(id).await.is_some());

        let removed = registry.remove(id).await;
        assert!(removed.is_some());
        assert_eq!(registry.active_count().await, 0);
    }
}
