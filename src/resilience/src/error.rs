use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResilienceError {
    #[error("rate-limited: no token available before deadline")]
    RateLimited,

    #[error("circuit-open: fast-failing admission")]
    CircuitOpen,

    #[error("concurrency limit reached before deadline")]
    ConcurrencyExhausted,

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}
