//! # Resilience
//!
//! The admission chain (rate limit → concurrency semaphore → circuit
//! breaker) and the capped-backoff retry policy applied to tool execution
//! (§4.1, §5, §7).

pub mod admission;
pub mod breaker;
pub mod error;
pub mod rate_limiter;
pub mod retry;
pub mod semaphore;

pub use admission::{AdmissionChain, AdmissionConfig, AdmissionGuard};
pub use breaker::{BreakerConfig, BreakerState, CircuitBreaker};
pub use error::ResilienceError;
pub use rate_limiter::RateLimiter;
pub use retry::{retry_with_backoff, RetryConfig};
pub use semaphore::ConcurrencyLimiter;
