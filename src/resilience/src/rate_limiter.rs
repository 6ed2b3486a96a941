//! Token-bucket rate limiter, keyed to the whole service (§4.1 admission
//! step 1 — per-tenant limits are a gateway concern, out of scope here).

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::ResilienceError;

pub struct RateLimiter {
    state: Mutex<BucketState>,
    requests_per_second: f64,
    burst_size: f64,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        Self {
            state: Mutex::new(BucketState { tokens: burst_size as f64, last_refill: Instant::now() }),
            requests_per_second,
            burst_size: burst_size as f64,
        }
    }

    /// Blocks until a token is available or `deadline` elapses (measured
    /// from the call), whichever comes first.
    pub async fn acquire(&self, deadline: Duration) -> Result<(), ResilienceError> {
        let started = Instant::now();
        loop {
            {
                let mut state = self.state.lock().await;
                self.refill(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return Ok(());
                }
            }

            if started.elapsed() >= deadline {
                return Err(ResilienceError::RateLimited);
            }
            sleep(Duration::from_millis(10).min(deadline.saturating_sub(started.elapsed()))).await;
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let elapsed = state.last_refill.elapsed().as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.requests_per_second).min(self.burst_size);
        state.last_refill = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_capacity_is_immediately_available() {
        let limiter = RateLimiter::new(10.0, 5);
        for _ in 0..5 {
            limiter.acquire(Duration::from_millis(50)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn exhausted_bucket_fails_after_deadline() {
        let limiter = RateLimiter::new(1.0, 1);
        limiter.acquire(Duration::from_millis(50)).await.unwrap();
        let result = limiter.acquire(Duration::from_millis(20)).await;
        assert!(result.is_err());
    }
}
