//! Per-(tool, action, operation) resolution learning (§4.5): records
//! outcomes, derives confidence hints, and prunes stale records.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rtc_types::{ContextPattern, ResolutionRecord};
use tokio::sync::RwLock;

const MAX_CONTEXT_PATTERNS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct PruneConfig {
    pub horizon_days: i64,
    pub min_success_rate: f64,
    pub min_attempts: u64,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            horizon_days: 90,
            min_success_rate: 0.5,
            min_attempts: 5,
        }
    }
}

/// Keyed by `(tool_id, action, operation_id)`; persisted as a blob by the
/// capability the resolver is constructed with — this struct only holds the
/// in-process working copy.
pub struct ResolutionLearner {
    records: RwLock<HashMap<(String, String, String), ResolutionRecord>>,
}

impl Default for ResolutionLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionLearner {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn record_success(
        &self,
        tool_id: &str,
        action: &str,
        operation_id: &str,
        latency_ms: f64,
        context_params: &[String],
    ) {
        let mut records = self.records.write().await;
        let record = records
            .entry((tool_id.to_string(), action.to_string(), operation_id.to_string()))
            .or_insert_with(|| ResolutionRecord::new(action, operation_id));

        record.success_count += 1;
        record.last_success = Some(Utc::now());
        record.mean_latency_ms = running_mean(record.mean_latency_ms, record.success_count, latency_ms);

        for param in context_params {
            *record.parameter_patterns.entry(param.clone()).or_insert(0) += 1;
        }
        upsert_context_pattern(record, context_params);
    }

    pub async fn record_failure(&self, tool_id: &str, action: &str, operation_id: &str, error_kind: &str) {
        let mut records = self.records.write().await;
        let record = records
            .entry((tool_id.to_string(), action.to_string(), operation_id.to_string()))
            .or_insert_with(|| ResolutionRecord::new(action, operation_id));

        record.failure_count += 1;
        record.last_failure = Some(Utc::now());
        *record.error_patterns.entry(error_kind.to_string()).or_insert(0) += 1;
    }

    /// `{operation_id → confidence∈[0,100]}` for every operation this tool
    /// has ever resolved `action` to.
    pub async fn get_resolution_hints(
        &self,
        tool_id: &str,
        action: &str,
        context_params: &[String],
    ) -> BTreeMap<String, u8> {
        let records = self.records.read().await;
        let mut hints = BTreeMap::new();
        for ((rtool, raction, op_id), record) in records.iter() {
            if rtool != tool_id || raction != action {
                continue;
            }
            hints.insert(op_id.clone(), confidence(record, context_params));
        }
        hints
    }

    /// Removes records stale per `config`; returns the count removed.
    pub async fn prune(&self, config: PruneConfig) -> usize {
        let horizon = Utc::now() - ChronoDuration::days(config.horizon_days);
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| {
            let stale = record.last_success.map(|t| t < horizon).unwrap_or(true);
            let weak = record.success_ratio() < config.min_success_rate
                || record.attempt_count() < config.min_attempts;
            !(stale && weak)
        });
        before - records.len()
    }
}

fn running_mean(current_mean: f64, count_after_this_sample: u64, new_value: f64) -> f64 {
    if count_after_this_sample <= 1 {
        return new_value;
    }
    let n = count_after_this_sample as f64;
    current_mean + (new_value - current_mean) / n
}

fn upsert_context_pattern(record: &mut ResolutionRecord, params: &[String]) {
    let mut sorted = params.to_vec();
    sorted.sort();

    if let Some(existing) = record.context_patterns.iter_mut().find(|p| p.parameters == sorted) {
        existing.frequency += 1;
        existing.last_seen = Utc::now();
        return;
    }

    if record.context_patterns.len() >= MAX_CONTEXT_PATTERNS {
        if let Some(least_frequent_idx) = record
            .context_patterns
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.frequency)
            .map(|(i, _)| i)
        {
            record.context_patterns.remove(least_frequent_idx);
        }
    }
    record.context_patterns.push(ContextPattern {
        parameters: sorted,
        frequency: 1,
        last_seen: Utc::now(),
    });
}

fn confidence(record: &ResolutionRecord, context_params: &[String]) -> u8 {
    let mut score = 50.0 * record.success_ratio();

    score += match record.last_success {
        Some(ts) if recency_hours(ts) <= 24.0 => 20.0,
        Some(ts) if recency_hours(ts) <= 24.0 * 7.0 => 10.0,
        _ => 0.0,
    };

    if let (Some(last_failure), Some(last_success)) = (record.last_failure, record.last_success) {
        if last_failure > last_success {
            score -= 30.0;
        }
    } else if record.last_failure.is_some() && record.last_success.is_none() {
        score -= 30.0;
    }

    score += 30.0 * context_similarity(record, context_params);

    score += match record.success_count {
        n if n > 100 => 20.0,
        n if n > 50 => 15.0,
        n if n > 10 => 10.0,
        _ => 0.0,
    };

    score.clamp(0.0, 100.0) as u8
}

fn recency_hours(ts: DateTime<Utc>) -> f64 {
    (Utc::now() - ts).num_minutes() as f64 / 60.0
}

fn context_similarity(record: &ResolutionRecord, context_params: &[String]) -> f64 {
    let total: u64 = record.parameter_patterns.values().sum();
    if total == 0 {
        return 0.0;
    }
    let matched: u64 = context_params
        .iter()
        .filter_map(|p| record.parameter_patterns.get(p))
        .sum();
    matched as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn twenty_successes_yield_high_confidence() {
        let learner = ResolutionLearner::new();
        let ctx = vec!["owner".to_string(), "repo".to_string()];
        for _ in 0..20 {
            learner
                .record_success("github", "list", "issues/list-for-repo", 12.0, &ctx)
                .await;
        }
        let hints = learner.get_resolution_hints("github", "list", &ctx).await;
        assert!(*hints.get("issues/list-for-repo").unwrap() >= 60);
    }

    #[tokio::test]
    async fn failure_after_success_depresses_confidence() {
        let learner = ResolutionLearner::new();
        let ctx = vec!["owner".to_string()];
        learner.record_success("github", "get", "repos/get", 5.0, &ctx).await;
        learner.record_failure("github", "get", "repos/get", "not_found").await;

        let hints = learner.get_resolution_hints("github", "get", &ctx).await;
        assert!(*hints.get("repos/get").unwrap() < 50);
    }

    #[tokio::test]
    async fn prune_removes_weak_stale_records() {
        let learner = ResolutionLearner::new();
        learner.record_failure("t", "a", "op", "timeout").await;
        {
            let mut records = learner.records.write().await;
            let record = records.get_mut(&("t".to_string(), "a".to_string(), "op".to_string())).unwrap();
            record.last_failure = Some(Utc::now() - ChronoDuration::days(200));
        }
        let removed = learner.prune(PruneConfig::default()).await;
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn context_patterns_are_capped_at_ten() {
        let learner = ResolutionLearner::new();
        for i in 0..15 {
            let ctx = vec![format!("param{i}")];
            learner.record_success("t", "a", "op", 1.0, &ctx).await;
        }
        let records = learner.records.read().await;
        let record = records.get(&("t".to_string(), "a".to_string(), "op".to_string())).unwrap();
        assert!(record.context_patterns.len() <= 10);
    }
}
