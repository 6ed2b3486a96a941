//! The persisted execution-history row shape (§6 "Persisted state layout").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cost::Money;
use crate::execution::ExecutionMode;
use crate::ids::{AgentId, ContextId, ExecutionId, TenantId, ToolId};
use crate::intelligence::{ContentType, IntelligenceMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionHistoryRow {
    pub execution_id: ExecutionId,
    pub tenant_id: TenantId,
    pub agent_id: AgentId,
    pub tool_id: ToolId,
    pub action: String,
    pub request_data: Value,
    pub response_data: Value,
    pub execution_mode: ExecutionMode,
    pub status: ExecutionStatus,
    pub content_type: ContentType,
    pub intelligence_metadata: Option<IntelligenceMetadata>,
    pub context_id: Option<ContextId>,
    pub embedding_id: Option<String>,
    pub execution_time_ms: u64,
    pub embedding_time_ms: u64,
    pub total_tokens: u64,
    pub total_cost_usd: Money,
    pub created_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
