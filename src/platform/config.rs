use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use costctl::{CostConfig, TrackingGranularity};
use execution::ExecutionConfig;
use resilience::{AdmissionConfig, BreakerConfig, RetryConfig};
use rtc_types::ExecutionMode;
use security::SecurityConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "configs/core.toml";

/// The core's full configuration (§6 "Configuration (enumerated)"):
/// execution, breaker, retry, rate limit, cost, and security sections,
/// plus the metadata/observability sections every deployment needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub metadata: MetadataSettings,
    pub observability: ObservabilitySettings,
    pub execution: ExecutionSettings,
    pub breaker: BreakerSettings,
    pub retry: RetrySettings,
    pub rate_limit: RateLimitSettings,
    pub cost: CostSettings,
    pub security: SecuritySettings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            metadata: MetadataSettings::default(),
            observability: ObservabilitySettings::default(),
            execution: ExecutionSettings::default(),
            breaker: BreakerSettings::default(),
            retry: RetrySettings::default(),
            rate_limit: RateLimitSettings::default(),
            cost: CostSettings::default(),
            security: SecuritySettings::default(),
        }
    }
}

impl CoreConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(None::<PathBuf>)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            File::from(PathBuf::from(DEFAULT_CONFIG_PATH))
                .format(FileFormat::Toml)
                .required(false),
        );

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.as_ref()).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("RTC").separator("__"));

        let config = builder.build()?;
        config.try_deserialize().context("invalid core configuration")
    }

    pub fn to_execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            default_mode: self.execution.default_mode.into(),
            enable_async_fallback: self.execution.enable_async_fallback,
            max_concurrency: self.execution.max_concurrency,
            timeout_seconds: self.execution.timeout_seconds,
            cache_enabled: self.execution.cache_enabled,
            cache_ttl: Duration::from_secs(self.execution.cache_ttl_seconds),
        }
    }

    pub fn to_admission_config(&self) -> AdmissionConfig {
        AdmissionConfig {
            requests_per_second: self.rate_limit.requests_per_second,
            burst_size: self.rate_limit.burst_size,
            max_concurrency: self.execution.max_concurrency,
            breaker: BreakerConfig {
                max_requests: self.breaker.max_requests,
                interval: Duration::from_secs(self.breaker.interval_seconds),
                timeout: Duration::from_secs(self.breaker.timeout_seconds),
            },
        }
    }

    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.retry.max_retries,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            multiplier: self.retry.multiplier,
        }
    }

    pub fn to_cost_config(&self) -> CostConfig {
        CostConfig {
            global_daily_limit: self.cost.global_daily_limit(),
            global_monthly_limit: self.cost.global_monthly_limit(),
            warning_threshold: self.cost.warning_threshold,
            critical_threshold: self.cost.critical_threshold,
            strict_enforcement: self.cost.strict_enforcement,
            grace_period_minutes: self.cost.grace_period_minutes,
            retention_days: self.cost.retention_days,
            tracking_granularity: self.cost.tracking_granularity.into(),
        }
    }

    pub fn to_security_config(&self) -> SecurityConfig {
        SecurityConfig {
            enable_pii_detection: self.security.enable_pii_detection,
            enable_secret_scanning: self.security.enable_secret_scanning,
            enable_encryption: self.security.enable_encryption,
            encryption_key: self.security.encryption_key.as_ref().map(|k| k.clone().into_bytes()),
            redact_pii: self.security.redact_pii,
            block_on_secrets: self.security.block_on_secrets,
            audit_enabled: self.security.audit_enabled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub name: String,
    pub environment: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self { name: "rtc-core".to_string(), environment: "development".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionModeSetting {
    Sync,
    Async,
    Hybrid,
}

impl From<ExecutionModeSetting> for ExecutionMode {
    fn from(value: ExecutionModeSetting) -> Self {
        match value {
            ExecutionModeSetting::Sync => ExecutionMode::Sync,
            ExecutionModeSetting::Async => ExecutionMode::Async,
            ExecutionModeSetting::Hybrid => ExecutionMode::Hybrid,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub default_mode: ExecutionModeSetting,
    pub enable_async_fallback: bool,
    pub max_concurrency: usize,
    pub timeout_seconds: u64,
    pub cache_enabled: bool,
    pub cache_ttl_seconds: u64,
    /// p99 wall-time target (§4.1 "SLO accounting"); violations are logged only.
    pub slo_target_ms: u64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            default_mode: ExecutionModeSetting::Sync,
            enable_async_fallback: true,
            max_concurrency: 50,
            timeout_seconds: 30,
            cache_enabled: true,
            cache_ttl_seconds: 300,
            slo_target_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSettings {
    pub max_requests: u32,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self { max_requests: 5, interval_seconds: 60, timeout_seconds: 30 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_retries: 3, initial_backoff_ms: 100, max_backoff_ms: 5000, multiplier: 2.0 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub requests_per_second: f64,
    pub burst_size: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self { requests_per_second: 100.0, burst_size: 20 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingGranularitySetting {
    Execution,
    Hourly,
    Daily,
}

impl From<TrackingGranularitySetting> for TrackingGranularity {
    fn from(value: TrackingGranularitySetting) -> Self {
        match value {
            TrackingGranularitySetting::Execution => TrackingGranularity::Execution,
            TrackingGranularitySetting::Hourly => TrackingGranularity::Hourly,
            TrackingGranularitySetting::Daily => TrackingGranularity::Daily,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSettings {
    /// USD, as a decimal string so `config`'s env/file layering never loses precision to a float.
    pub global_daily_limit: String,
    pub global_monthly_limit: String,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub strict_enforcement: bool,
    pub grace_period_minutes: u32,
    pub retention_days: i64,
    pub tracking_granularity: TrackingGranularitySetting,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            global_daily_limit: "1000.00".to_string(),
            global_monthly_limit: "20000.00".to_string(),
            warning_threshold: 0.8,
            critical_threshold: 0.95,
            strict_enforcement: true,
            grace_period_minutes: 0,
            retention_days: 90,
            tracking_granularity: TrackingGranularitySetting::Execution,
        }
    }
}

impl CostSettings {
    fn global_daily_limit(&self) -> rtc_types::Money {
        self.global_daily_limit.parse().unwrap_or(rtc_types::Money::ZERO)
    }

    fn global_monthly_limit(&self) -> rtc_types::Money {
        self.global_monthly_limit.parse().unwrap_or(rtc_types::Money::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub enable_pii_detection: bool,
    pub enable_secret_scanning: bool,
    pub enable_encryption: bool,
    pub encryption_key: Option<String>,
    pub redact_pii: bool,
    pub block_on_secrets: bool,
    pub audit_enabled: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            enable_pii_detection: true,
            enable_secret_scanning: true,
            enable_encryption: false,
            encryption_key: None,
            redact_pii: true,
            block_on_secrets: true,
            audit_enabled: true,
        }
    }
}
