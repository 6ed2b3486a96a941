//! The capabilities the execution pipeline consumes but does not own (§6):
//! tool execution, content analysis, embedding generation, the semantic
//! graph, and the event bus. Each is a narrow trait defined here (the
//! consuming crate), mirroring `learner::ExternalCache` and
//! `costctl::CostRepository` — concrete implementations (a real adapter, or
//! an in-memory stand-in for tests and the demo) are supplied by the root
//! crate at construction time.

use std::collections::HashMap;

use async_trait::async_trait;
use rtc_types::{ContentAnalysis, ContextId, Event, ToolId};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ToolExecutionError {
    pub message: String,
    /// Per §6: "errors are retryable unless marked permanent".
    pub retryable: bool,
}

impl ToolExecutionError {
    pub fn permanent(message: impl Into<String>) -> Self {
        Self { message: message.into(), retryable: false }
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self { message: message.into(), retryable: true }
    }
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// May block on network I/O. The pipeline measures wall time around
    /// this call itself rather than trusting a self-reported duration.
    async fn execute(&self, tool_id: ToolId, action: &str, params: &HashMap<String, Value>) -> Result<Value, ToolExecutionError>;
}

#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Pure-ish; failure is non-fatal to the pipeline (§7).
    async fn analyze(&self, bytes: &[u8]) -> Result<ContentAnalysis, String>;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// May block; billed by tokens. Returns an opaque embedding id.
    async fn generate(&self, text: &str, metadata: &HashMap<String, Value>) -> Result<String, String>;
}

/// What stage 6 attaches to a freshly allocated semantic-graph node.
#[derive(Debug, Clone)]
pub struct SemanticNodeMetadata {
    pub execution_id: rtc_types::ExecutionId,
    pub content_type: rtc_types::ContentType,
    pub classification: rtc_types::DataClassification,
    pub language: Option<String>,
}

#[async_trait]
pub trait SemanticGraph: Send + Sync {
    async fn add_node(&self, context_id: ContextId, metadata: SemanticNodeMetadata) -> Result<(), String>;
    async fn create_relationship(&self, from: ContextId, to: ContextId, relationship: &str) -> Result<(), String>;
    async fn find_related(&self, context_id: ContextId, max_distance: u32) -> Result<Vec<ContextId>, String>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// At-least-once; subscribers (including this service's own detached
    /// workers) must be idempotent.
    async fn publish(&self, event: Event) -> Result<(), String>;
}

/// Stage 7's persistence target (§6 "Persisted state layout"). Kept
/// separate from `EventStore`: one is a log of things that happened, this
/// is the queryable execution-history table.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert(&self, row: rtc_types::ExecutionHistoryRow) -> Result<(), String>;
}
