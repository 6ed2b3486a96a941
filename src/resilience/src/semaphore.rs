//! Concurrency admission (§4.1 admission step 2): acquire one permit,
//! release unconditionally on drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::ResilienceError;

pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    pub fn new(max_concurrency: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(max_concurrency)) }
    }

    pub async fn acquire(&self, deadline: Duration) -> Result<SemaphorePermit<'_>, ResilienceError> {
        tokio::time::timeout(deadline, self.semaphore.acquire())
            .await
            .map_err(|_| ResilienceError::ConcurrencyExhausted)?
            .map_err(|_| ResilienceError::ConcurrencyExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_permit_blocks_second_caller() {
        let limiter = ConcurrencyLimiter::new(1);
        let _permit = limiter.acquire(Duration::from_millis(50)).await.unwrap();
        let second = limiter.acquire(Duration::from_millis(20)).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn permit_release_unblocks_next_caller() {
        let limiter = ConcurrencyLimiter::new(1);
        {
            let _permit = limiter.acquire(Duration::from_millis(50)).await.unwrap();
        }
        let second = limiter.acquire(Duration::from_millis(50)).await;
        assert!(second.is_ok());
    }
}
