//! Execution-service configuration (§6 "Configuration (enumerated)" —
//! Execution section).

use std::time::Duration;

use rtc_types::ExecutionMode;

#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub default_mode: ExecutionMode,
    pub enable_async_fallback: bool,
    pub max_concurrency: usize,
    pub timeout_seconds: u64,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_mode: ExecutionMode::Sync,
            enable_async_fallback: true,
            max_concurrency: 50,
            timeout_seconds: 30,
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl ExecutionConfig {
    pub fn deadline(&self, override_seconds: Option<u64>) -> Duration {
        Duration::from_secs(override_seconds.unwrap_or(self.timeout_seconds))
    }
}

/// Independent deadlines for detached async/hybrid workers (§4.1): they
/// must never share the caller's deadline.
pub const ASYNC_WORKER_DEADLINE: Duration = Duration::from_secs(5 * 60);
pub const HYBRID_WORKER_DEADLINE: Duration = Duration::from_secs(2 * 60);
