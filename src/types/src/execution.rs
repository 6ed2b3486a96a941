//! Request/response shapes and the per-stage checkpoint record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cost::Money;
use crate::ids::{AgentId, ContextId, ExecutionId, TenantId, ToolId};
use crate::intelligence::IntelligenceMetadata;

/// How the pipeline is driven to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run all seven stages and await the full result.
    Sync,
    /// Return immediately; the pipeline runs on a detached worker.
    Async,
    /// Return after tool execution; defer analysis/intelligence/graph/persistence.
    Hybrid,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Sync
    }
}

/// The seven pipeline stages, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Security,
    CostCheck,
    ToolExecute,
    ContentAnalysis,
    Intelligence,
    SemanticGraph,
    Persistence,
}

impl StageName {
    /// The order stages happen-before one another in a single execution.
    pub const ORDER: [StageName; 7] = [
        StageName::Security,
        StageName::CostCheck,
        StageName::ToolExecute,
        StageName::ContentAnalysis,
        StageName::Intelligence,
        StageName::SemanticGraph,
        StageName::Persistence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Security => "security",
            StageName::CostCheck => "cost_check",
            StageName::ToolExecute => "tool_execute",
            StageName::ContentAnalysis => "content_analysis",
            StageName::Intelligence => "intelligence",
            StageName::SemanticGraph => "semantic_graph",
            StageName::Persistence => "persistence",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage's lifecycle. Transitions only ever move forward:
/// `pending -> running -> (completed | failed | skipped)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

/// An immutable request for the core to execute a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub execution_id: ExecutionId,
    pub tool_id: ToolId,
    pub agent_id: AgentId,
    pub tenant_id: TenantId,
    /// The verb or operation id the agent wants performed, e.g. `"get"`.
    pub action: String,
    pub params: HashMap<String, Value>,
    pub mode: ExecutionMode,
    pub metadata: HashMap<String, Value>,
    /// Overrides the service-wide default deadline for this request.
    pub timeout_seconds: Option<u64>,
}

impl ExecutionRequest {
    pub fn new(
        tool_id: ToolId,
        agent_id: AgentId,
        tenant_id: TenantId,
        action: impl Into<String>,
        params: HashMap<String, Value>,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            execution_id: uuid::Uuid::new_v4(),
            tool_id,
            agent_id,
            tenant_id,
            action: action.into(),
            params,
            mode,
            metadata: HashMap::new(),
            timeout_seconds: None,
        }
    }
}

/// Timing and cost rollup attached to every response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub execution_time_ms: u64,
    pub embedding_time_ms: u64,
    pub total_tokens: u64,
    pub total_cost_usd: Money,
    /// Set by async mode: the caller got an id, not a result.
    pub queued: bool,
    /// Set by hybrid mode: stages 4-7 are still running in the background.
    pub intelligence_deferred: bool,
}

/// The outcome of `execute()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub execution_id: ExecutionId,
    pub tool_result: Option<Value>,
    pub intelligence: Option<IntelligenceMetadata>,
    pub context_id: Option<ContextId>,
    pub related_contexts: Vec<ContextId>,
    pub metrics: ExecutionMetrics,
}

impl ExecutionResponse {
    pub fn for_request(request: &ExecutionRequest) -> Self {
        Self {
            execution_id: request.execution_id,
            tool_result: None,
            intelligence: None,
            context_id: None,
            related_contexts: Vec::new(),
            metrics: ExecutionMetrics::default(),
        }
    }
}

/// Per-stage observability record. One of these lives inside the
/// `ExecutionCheckpoint` for every stage name, whether or not the stage
/// has run yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCheckpoint {
    pub status: StageStatus,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub error: Option<String>,
}

impl StageCheckpoint {
    pub fn pending() -> Self {
        Self {
            status: StageStatus::Pending,
            start: None,
            end: None,
            input: None,
            output: None,
            error: None,
        }
    }
}

/// Process-local record of one execution's progress through the pipeline.
/// Created on admission, destroyed on completion or timeout; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionCheckpoint {
    pub id: ExecutionId,
    pub start_time: DateTime<Utc>,
    pub request: ExecutionRequest,
    pub stages: HashMap<StageName, StageCheckpoint>,
}

impl ExecutionCheckpoint {
    pub fn new(request: ExecutionRequest) -> Self {
        let mut stages = HashMap::new();
        for stage in StageName::ORDER {
            stages.insert(stage, StageCheckpoint::pending());
        }
        Self {
            id: request.execution_id,
            start_time: Utc::now(),
            request,
            stages,
        }
    }

    /// Move a stage from `pending` to `running`, recording its input.
    /// Panics if called twice for the same stage: that would mean a stage
    /// ran before its predecessor finished, violating the happens-before
    /// invariant.
    pub fn begin_stage(&mut self, stage: StageName, input: Value) {
        let checkpoint = self.stages.entry(stage).or_insert_with(StageCheckpoint::pending);
        debug_assert_eq!(checkpoint.status, StageStatus::Pending, "stage {stage} began twice");
        checkpoint.status = StageStatus::Running;
        checkpoint.start = Some(Utc::now());
        checkpoint.input = Some(input);
    }

    /// Move a running stage to a terminal status.
    pub fn end_stage(&mut self, stage: StageName, status: StageStatus, output: Option<Value>, error: Option<String>) {
        if let Some(checkpoint) = self.stages.get_mut(&stage) {
            checkpoint.status = status;
            checkpoint.end = Some(Utc::now());
            checkpoint.output = output;
            checkpoint.error = error;
        }
    }

    /// Skip a stage outright (never entered `running`).
    pub fn skip_stage(&mut self, stage: StageName, reason: impl Into<String>) {
        if let Some(checkpoint) = self.stages.get_mut(&stage) {
            checkpoint.status = StageStatus::Skipped;
            checkpoint.start.get_or_insert_with(Utc::now);
            checkpoint.end = Some(Utc::now());
            checkpoint.error = Some(reason.into());
        }
    }
}
