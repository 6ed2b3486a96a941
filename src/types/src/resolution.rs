//! Types owned by the resolver and learner: the two-level operation cache
//! entry and the persisted per-(action, operation) learning record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolved operation cached under `op_cache:{tool_id}[:{scope}]:{action}:{context_hash}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedOperation {
    pub operation_id: String,
    pub path: String,
    pub method: String,
    pub resolved_at: DateTime<Utc>,
    pub resolution_ms: u64,
    pub context_hash: String,
    pub score: i64,
    pub hit_count: u64,
    pub last_hit: DateTime<Utc>,
    pub resource_scope: Option<String>,
    pub tags: Vec<String>,
}

impl CachedOperation {
    pub fn new(
        operation_id: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
        context_hash: impl Into<String>,
        resolution_ms: u64,
        score: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            operation_id: operation_id.into(),
            path: path.into(),
            method: method.into(),
            resolved_at: now,
            resolution_ms,
            context_hash: context_hash.into(),
            score,
            hit_count: 0,
            last_hit: now,
            resource_scope: None,
            tags: Vec::new(),
        }
    }

    /// Registers a cache hit, bumping `hit_count` and `last_hit`.
    pub fn record_hit(&mut self) {
        self.hit_count += 1;
        self.last_hit = Utc::now();
    }
}

/// A single observed parameter bag for a `(action, operation)` pair, kept
/// to at most 10 per `ResolutionRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPattern {
    pub parameters: Vec<String>,
    pub frequency: u64,
    pub last_seen: DateTime<Utc>,
}

/// Per `(action, operation_id)` learning record, persisted inside the
/// tool's metadata blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub action: String,
    pub operation_id: String,
    pub success_count: u64,
    pub failure_count: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub mean_latency_ms: f64,
    pub context_patterns: Vec<ContextPattern>,
    pub parameter_patterns: HashMap<String, u64>,
    pub error_patterns: HashMap<String, u64>,
}

impl ResolutionRecord {
    pub fn new(action: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            operation_id: operation_id.into(),
            success_count: 0,
            failure_count: 0,
            last_success: None,
            last_failure: None,
            mean_latency_ms: 0.0,
            context_patterns: Vec::new(),
            parameter_patterns: HashMap::new(),
            error_patterns: HashMap::new(),
        }
    }

    pub fn success_ratio(&self) -> f64 {
        let total = self.success_count + self.failure_count;
        if total == 0 {
            0.0
        } else {
            self.success_count as f64 / total as f64
        }
    }

    pub fn attempt_count(&self) -> u64 {
        self.success_count + self.failure_count
    }
}
