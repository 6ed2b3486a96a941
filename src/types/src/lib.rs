//! # rtc-types
//!
//! Shared data model for the Resilient Tool Execution Core: the request and
//! response shapes, checkpoint/stage bookkeeping, content intelligence,
//! monetary types, the event wire format, and the persisted history row.
//!
//! Every other crate in the workspace depends on this one and nothing in
//! here depends back on them — it is the leaf of the dependency graph.

pub mod cost;
pub mod events;
pub mod execution;
pub mod history;
pub mod ids;
pub mod intelligence;
pub mod resolution;

pub use cost::{
    AlertLevel, CostAlert, CostBreakdown, CostCheckRequest, CostCheckResponse, CostRecord, Money,
    TenantBudget, UsagePeriod, UsageSummary, UsageTrends,
};
pub use events::{Event, EventType};
pub use execution::{
    ExecutionCheckpoint, ExecutionMetrics, ExecutionMode, ExecutionRequest, ExecutionResponse,
    StageCheckpoint, StageName, StageStatus,
};
pub use history::{ExecutionHistoryRow, ExecutionStatus};
pub use ids::{AgentId, ContextId, ExecutionId, OperationId, TenantId, ToolId};
pub use intelligence::{
    ContentAnalysis, ContentType, DataClassification, Entity, IntelligenceMetadata, Sentiment,
    Topic,
};
pub use resolution::{CachedOperation, ContextPattern, ResolutionRecord};
