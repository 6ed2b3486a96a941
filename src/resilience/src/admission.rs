//! The admission chain (§4.1): rate limiter, then concurrency semaphore,
//! then circuit breaker, applied in that order before any pipeline stage
//! runs.

use std::time::Duration;

use tokio::sync::SemaphorePermit;

use crate::breaker::{BreakerConfig, CircuitBreaker};
use crate::error::ResilienceError;
use crate::rate_limiter::RateLimiter;
use crate::semaphore::ConcurrencyLimiter;

pub struct AdmissionConfig {
    pub requests_per_second: f64,
    pub burst_size: u32,
    pub max_concurrency: usize,
    pub breaker: BreakerConfig,
}

pub struct AdmissionChain {
    rate_limiter: RateLimiter,
    concurrency: ConcurrencyLimiter,
    breaker: CircuitBreaker,
}

pub struct AdmissionGuard<'a> {
    _permit: SemaphorePermit<'a>,
}

impl AdmissionChain {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            rate_limiter: RateLimiter::new(config.requests_per_second, config.burst_size),
            concurrency: ConcurrencyLimiter::new(config.max_concurrency),
            breaker: CircuitBreaker::new(config.breaker),
        }
    }

    /// Runs all three admission steps; on success the caller holds an
    /// `AdmissionGuard` releasing the concurrency permit on drop, and is
    /// responsible for calling `record_success`/`record_failure` on the
    /// breaker once the tool-execution stage completes.
    pub async fn admit(&self, deadline: Duration) -> Result<AdmissionGuard<'_>, ResilienceError> {
        self.rate_limiter.acquire(deadline).await?;
        let permit = self.concurrency.acquire(deadline).await?;
        self.breaker.admit().await?;
        Ok(AdmissionGuard { _permit: permit })
    }

    pub async fn record_success(&self) {
        self.breaker.record_success().await;
    }

    pub async fn record_failure(&self) {
        self.breaker.record_failure().await;
    }
}
