//! Prometheus metrics for the execution pipeline and admission chain.
//! Carries no HTTP listener — the demo binary renders the registry
//! directly instead of serving it over the network.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_histogram_vec, CounterVec, Encoder, Gauge, GaugeVec,
    HistogramVec, Registry, TextEncoder,
};
use rtc_types::StageName;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();

    static ref STAGE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "rtc_stage_duration_seconds",
        "Wall-clock duration of one pipeline stage",
        &["stage"]
    ).expect("can't create rtc_stage_duration_seconds metric");

    static ref STAGE_OUTCOMES_TOTAL: CounterVec = register_counter_vec!(
        "rtc_stage_outcomes_total",
        "Pipeline stage completions by outcome",
        &["stage", "outcome"]
    ).expect("can't create rtc_stage_outcomes_total metric");

    static ref ADMISSION_DENIALS_TOTAL: CounterVec = register_counter_vec!(
        "rtc_admission_denials_total",
        "Requests rejected before reaching the pipeline",
        &["reason"]
    ).expect("can't create rtc_admission_denials_total metric");

    static ref CIRCUIT_BREAKER_STATE: Gauge = register_gauge!(
        "rtc_circuit_breaker_state",
        "Circuit breaker state: 0=closed, 1=half_open, 2=open"
    ).expect("can't create rtc_circuit_breaker_state metric");

    static ref TENANT_SPEND: GaugeVec = register_gauge_vec!(
        "rtc_tenant_spend_usd",
        "Running spend for a tenant in the current tracking window",
        &["tenant_id", "window"]
    ).expect("can't create rtc_tenant_spend_usd metric");

    static ref CACHE_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "rtc_cache_requests_total",
        "Resolution cache lookups by outcome",
        &["outcome"]
    ).expect("can't create rtc_cache_requests_total metric");
}

/// Thin wrapper over the process-wide registry, mirroring the teacher's
/// `MetricsCollector` but scoped to the seven pipeline stages (§4) and the
/// admission chain (§3) instead of discovery events.
pub struct MetricsCollector {
    registry: Registry,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self { registry: REGISTRY.clone() }
    }

    pub fn record_stage(&self, stage: StageName, duration_seconds: f64, outcome: &str) {
        STAGE_DURATION_SECONDS.with_label_values(&[stage.as_str()]).observe(duration_seconds);
        STAGE_OUTCOMES_TOTAL.with_label_values(&[stage.as_str(), outcome]).inc();
    }

    pub fn record_admission_denial(&self, reason: &str) {
        ADMISSION_DENIALS_TOTAL.with_label_values(&[reason]).inc();
    }

    pub fn set_breaker_state(&self, state: f64) {
        CIRCUIT_BREAKER_STATE.set(state);
    }

    pub fn set_tenant_spend(&self, tenant_id: &str, window: &str, amount: f64) {
        TENANT_SPEND.with_label_values(&[tenant_id, window]).set(amount);
    }

    pub fn record_cache_outcome(&self, outcome: &str) {
        CACHE_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Renders the registry in the Prometheus text exposition format; the
    /// demo binary prints this rather than serving it from a listener.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Module-level accessor so callers that just want to render metrics don't
/// need to construct a collector.
pub fn metrics_registry() -> MetricsCollector {
    MetricsCollector::new()
}

/// RAII timer that records a stage's duration when dropped, mirroring the
/// teacher's `PerformanceTimer`.
pub struct StageTimer {
    start: std::time::Instant,
    stage: StageName,
    outcome: &'static str,
    collector: MetricsCollector,
}

impl StageTimer {
    pub fn start(stage: StageName) -> Self {
        Self { start: std::time::Instant::now(), stage, outcome: "completed", collector: MetricsCollector::new() }
    }

    pub fn mark_failed(&mut self) {
        self.outcome = "failed";
    }

    pub fn mark_skipped(&mut self) {
        self.outcome = "skipped";
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        self.collector.record_stage(self.stage, self.start.elapsed().as_secs_f64(), self.outcome);
    }
}
