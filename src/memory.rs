//! In-memory stand-ins for every capability the execution core consumes
//! (§6). These are not meant to be the "real" ContentAnalyzer/EmbeddingService/
//! SemanticGraph/CostRepository/etc — those remain external collaborators —
//! they exist so the pipeline, the demo, and the integration tests can run
//! without any of them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use costctl::CostRepository;
use execution::{ContentAnalyzer, EmbeddingService, EventStore, HistoryStore, SemanticGraph, SemanticNodeMetadata, ToolExecutionError, ToolExecutor};
use learner::{ExternalCache, LearnerError};
use rtc_types::{
    ContentAnalysis, ContentType, ContextId, CostAlert, CostBreakdown, Event, ExecutionHistoryRow,
    ExecutionId, TenantBudget, TenantId, ToolId, UsagePeriod, UsageSummary,
};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Echoes its params back as the tool result — just enough to exercise
/// stage 3 without a real external call.
pub struct EchoToolExecutor;

#[async_trait]
impl ToolExecutor for EchoToolExecutor {
    async fn execute(&self, _tool_id: ToolId, action: &str, params: &HashMap<String, Value>) -> Result<Value, ToolExecutionError> {
        Ok(serde_json::json!({ "action": action, "echo": params }))
    }
}

/// Classifies everything as JSON text of the observed byte length; never fails.
pub struct NoopContentAnalyzer;

#[async_trait]
impl ContentAnalyzer for NoopContentAnalyzer {
    async fn analyze(&self, bytes: &[u8]) -> Result<ContentAnalysis, String> {
        Ok(ContentAnalysis { content_type: ContentType::Json, size: bytes.len(), has_pii: false, has_secrets: false, language: None })
    }
}

/// Returns a deterministic embedding id derived from the text's length,
/// standing in for a real embedding model.
pub struct NoopEmbeddingService;

#[async_trait]
impl EmbeddingService for NoopEmbeddingService {
    async fn generate(&self, text: &str, _metadata: &HashMap<String, Value>) -> Result<String, String> {
        Ok(format!("stub-embedding-{}", text.len()))
    }
}

/// Keeps nodes and edges in a process-local map; `find_related` walks one
/// hop of declared relationships.
#[derive(Default)]
pub struct InMemorySemanticGraph {
    edges: RwLock<HashMap<ContextId, Vec<ContextId>>>,
}

impl InMemorySemanticGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SemanticGraph for InMemorySemanticGraph {
    async fn add_node(&self, context_id: ContextId, _metadata: SemanticNodeMetadata) -> Result<(), String> {
        self.edges.write().await.entry(context_id).or_default();
        Ok(())
    }

    async fn create_relationship(&self, from: ContextId, to: ContextId, _relationship: &str) -> Result<(), String> {
        self.edges.write().await.entry(from).or_default().push(to);
        Ok(())
    }

    async fn find_related(&self, context_id: ContextId, _max_distance: u32) -> Result<Vec<ContextId>, String> {
        Ok(self.edges.read().await.get(&context_id).cloned().unwrap_or_default())
    }
}

/// Appends every published event to an in-process log; nothing consumes it
/// but tests/the demo can inspect it directly.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn publish(&self, event: Event) -> Result<(), String> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// The execution-history table (§6 "Persisted state layout"), kept as a
/// `Vec` in a mutex — no query support, just enough for the demo and tests
/// to assert a row landed.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    rows: Mutex<Vec<ExecutionHistoryRow>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rows(&self) -> Vec<ExecutionHistoryRow> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn insert(&self, row: ExecutionHistoryRow) -> Result<(), String> {
        self.rows.lock().await.push(row);
        Ok(())
    }
}

/// `CostRepository` backed by an in-process map of tenant budgets, seeded
/// with `TenantBudget::default_for` on first use; cost breakdowns and
/// alerts are kept for inspection but never pruned.
#[derive(Default)]
pub struct InMemoryCostRepository {
    budgets: RwLock<HashMap<TenantId, TenantBudget>>,
    breakdowns: RwLock<HashMap<ExecutionId, CostBreakdown>>,
    alerts: Mutex<Vec<CostAlert>>,
    grace_tenants: RwLock<std::collections::HashSet<TenantId>>,
}

impl InMemoryCostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_budget(&self, budget: TenantBudget) {
        self.budgets.write().await.insert(budget.tenant_id, budget);
    }

    pub async fn grant_grace_period(&self, tenant_id: TenantId) {
        self.grace_tenants.write().await.insert(tenant_id);
    }
}

#[async_trait]
impl CostRepository for InMemoryCostRepository {
    async fn store_cost(&self, breakdown: &CostBreakdown) -> Result<(), costctl::CostError> {
        self.breakdowns.write().await.insert(breakdown.execution_id, breakdown.clone());
        Ok(())
    }

    async fn get_cost_breakdown(&self, execution_id: ExecutionId) -> Result<Option<CostBreakdown>, costctl::CostError> {
        Ok(self.breakdowns.read().await.get(&execution_id).cloned())
    }

    async fn get_usage_breakdown(&self, tenant_id: TenantId, period: UsagePeriod) -> Result<UsageSummary, costctl::CostError> {
        Ok(UsageSummary {
            tenant_id,
            period,
            daily_spend: rtc_types::Money::ZERO,
            monthly_spend: rtc_types::Money::ZERO,
            trends: Default::default(),
            top_operations: Vec::new(),
            recommendations: Vec::new(),
        })
    }

    async fn get_tenant_budget(&self, tenant_id: TenantId) -> Result<Option<TenantBudget>, costctl::CostError> {
        Ok(Some(self.budgets.read().await.get(&tenant_id).cloned().unwrap_or_else(|| TenantBudget::default_for(tenant_id))))
    }

    async fn get_all_tenant_budgets(&self) -> Result<Vec<TenantBudget>, costctl::CostError> {
        Ok(self.budgets.read().await.values().cloned().collect())
    }

    async fn is_in_grace_period(&self, tenant_id: TenantId) -> Result<bool, costctl::CostError> {
        Ok(self.grace_tenants.read().await.contains(&tenant_id))
    }

    async fn store_alert(&self, alert: &CostAlert) -> Result<(), costctl::CostError> {
        self.alerts.lock().await.push(alert.clone());
        Ok(())
    }
}

/// `learner::ExternalCache` backed by a process-local map; stands in for
/// the real L2 (Redis-shaped) cache the resolver would otherwise use.
#[derive(Default)]
pub struct InMemoryExternalCache {
    entries: RwLock<HashMap<String, (Vec<u8>, std::time::Instant, Duration)>>,
}

impl InMemoryExternalCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExternalCache for InMemoryExternalCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LearnerError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).filter(|(_, set_at, ttl)| set_at.elapsed() < *ttl).map(|(bytes, _, _)| bytes.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), LearnerError> {
        self.entries.write().await.insert(key.to_string(), (value, std::time::Instant::now(), ttl));
        Ok(())
    }
}

/// Bundles all the stand-ins above into the `execution::Capabilities`
/// struct the pipeline is constructed with.
pub fn demo_capabilities() -> execution::Capabilities {
    execution::Capabilities {
        tool_executor: Arc::new(EchoToolExecutor),
        content_analyzer: Arc::new(NoopContentAnalyzer),
        embedding_service: Arc::new(NoopEmbeddingService),
        semantic_graph: Arc::new(InMemorySemanticGraph::new()),
        history_store: Arc::new(InMemoryHistoryStore::new()),
    }
}

pub fn random_tool_id() -> Uuid {
    Uuid::new_v4()
}
