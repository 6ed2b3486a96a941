//! Circuit breaker (§4.1 admission step 3): closed/open/half-open state
//! machine. Trips when at least 3 requests have been observed in the
//! current window and the failure ratio is ≥0.6.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::ResilienceError;

const TRIP_MIN_REQUESTS: usize = 3;
const TRIP_FAILURE_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
    pub max_requests: u32,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self { max_requests: 5, interval: Duration::from_secs(60), timeout: Duration::from_secs(30) }
    }
}

struct Inner {
    state: BreakerState,
    window: VecDeque<(Instant, bool)>,
    opened_at: Option<Instant>,
    half_open_probes: u32,
}

pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                window: VecDeque::new(),
                opened_at: None,
                half_open_probes: 0,
            }),
        }
    }

    /// Checks whether a request may proceed, transitioning open→half-open
    /// after `config.timeout` has elapsed.
    pub async fn admit(&self) -> Result<(), ResilienceError> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.config.timeout {
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_probes = 1;
                    Ok(())
                } else {
                    Err(ResilienceError::CircuitOpen)
                }
            }
            BreakerState::HalfOpen => {
                if inner.half_open_probes < self.config.max_requests {
                    inner.half_open_probes += 1;
                    Ok(())
                } else {
                    Err(ResilienceError::CircuitOpen)
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == BreakerState::HalfOpen {
            inner.state = BreakerState::Closed;
            inner.window.clear();
            inner.opened_at = None;
            inner.half_open_probes = 0;
            return;
        }
        self.observe(&mut inner, true);
    }

    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == BreakerState::HalfOpen {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(Instant::now());
            inner.half_open_probes = 0;
            return;
        }
        self.observe(&mut inner, false);
    }

    pub async fn state(&self) -> BreakerState {
        self.inner.lock().await.state
    }

    fn observe(&self, inner: &mut Inner, success: bool) {
        let now = Instant::now();
        inner.window.push_back((now, success));
        while inner.window.front().is_some_and(|(t, _)| now.duration_since(*t) > self.config.interval) {
            inner.window.pop_front();
        }

        if inner.window.len() >= TRIP_MIN_REQUESTS {
            let failures = inner.window.iter().filter(|(_, ok)| !ok).count();
            let ratio = failures as f64 / inner.window.len() as f64;
            if ratio >= TRIP_FAILURE_RATIO {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trips_open_after_majority_failures() {
        let breaker = CircuitBreaker::new(BreakerConfig::default());
        for _ in 0..10 {
            breaker.admit().await.unwrap();
            breaker.record_failure().await;
        }
        assert_eq!(breaker.state().await, BreakerState::Open);
        assert!(breaker.admit().await.is_err());
    }

    #[tokio::test]
    async fn half_open_closes_on_success() {
        let config = BreakerConfig { timeout: Duration::from_millis(10), ..BreakerConfig::default() };
        let breaker = CircuitBreaker::new(config);
        for _ in 0..5 {
            breaker.admit().await.unwrap();
            breaker.record_failure().await;
        }
        assert_eq!(breaker.state().await, BreakerState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;
        breaker.admit().await.unwrap();
        assert_eq!(breaker.state().await, BreakerState::HalfOpen);
        breaker.record_success().await;
        assert_eq!(breaker.state().await, BreakerState::Closed);
    }

    #[tokio::test]
    async fn stays_closed_under_minority_failures() {
        let breaker = CircuitBreaker::new(BreakerConfig::default());
        for _ in 0..10 {
            breaker.admit().await.unwrap();
            breaker.record_success().await;
        }
        breaker.record_failure().await;
        assert_eq!(breaker.state().await, BreakerState::Closed);
    }
}
