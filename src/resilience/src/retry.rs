//! Capped exponential-backoff retry, applied only to tool execution (§7:
//! "a capped exponential-backoff retry is applied by the resilience layer;
//! the retry predicate is configurable").
//!
//! Open Question 1 (retry predicate undefined in source) is resolved here:
//! only errors the caller's predicate marks retryable are retried — per
//! `ToolExecutor`'s contract ("errors are retryable unless marked
//! permanent"), everything else is surfaced immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

pub async fn retry_with_backoff<T, E, F, Fut>(config: RetryConfig, is_retryable: impl Fn(&E) -> bool, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut backoff = config.initial_backoff;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.max_retries && is_retryable(&err) => {
                tracing::debug!(attempt, ?backoff, "retrying after retryable failure");
                sleep(backoff).await;
                attempt += 1;
                backoff = Duration::from_secs_f64((backoff.as_secs_f64() * config.multiplier).min(config.max_backoff.as_secs_f64()));
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);
        let config = RetryConfig { initial_backoff: Duration::from_millis(1), ..RetryConfig::default() };

        let result: Result<&str, &str> = retry_with_backoff(config, |_| true, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err("transient") } else { Ok("ok") } }
        })
        .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let config = RetryConfig::default();

        let result: Result<&str, &str> = retry_with_backoff(config, |_| false, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err("permanent") }
        })
        .await;

        assert_eq!(result, Err("permanent"));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_max_retries() {
        let attempts = AtomicU32::new(0);
        let config = RetryConfig { max_retries: 2, initial_backoff: Duration::from_millis(1), ..RetryConfig::default() };

        let result: Result<&str, &str> = retry_with_backoff(config, |_| true, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err("always fails") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
