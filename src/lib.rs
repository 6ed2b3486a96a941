//! Resilient Tool Execution Core: admits, executes, and accounts for
//! external tool calls on behalf of AI agents, gated by security scanning,
//! per-tenant budgets, and a rate-limit/concurrency/circuit-breaker
//! admission chain (§3-§4).

pub mod memory;
pub mod platform;
pub mod resolver_registry;

use std::collections::HashMap;
use std::sync::Arc;

use costctl::CostController;
use execution::ExecutionService;
use resolver::{ResolvedOperation, ResolverError};
use rtc_types::{
    CostBreakdown, CostCheckRequest, CostCheckResponse, CostRecord, ExecutionId, ExecutionRequest, ExecutionResponse, TenantId, ToolId,
    UsagePeriod, UsageSummary,
};

use platform::PlatformContext;

/// Facade over a running platform exposing the six operations capabilities
/// consume (§6): execute a tool call, price and charge it, and inspect a
/// tenant's spend.
#[derive(Clone)]
pub struct RtcCore {
    context: PlatformContext,
}

impl RtcCore {
    pub fn new(context: PlatformContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &PlatformContext {
        &self.context
    }

    fn execution(&self) -> Arc<ExecutionService> {
        self.context.execution()
    }

    fn cost(&self) -> Arc<CostController> {
        self.context.cost()
    }

    /// Runs the seven-stage pipeline for one tool call (§4).
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResponse, execution::ExecutionError> {
        self.execution().execute(request).await
    }

    /// Prices a prospective call against the tenant's budget without
    /// charging it (§5 `check_budget`).
    pub async fn check_budget(&self, request: CostCheckRequest) -> CostCheckResponse {
        self.cost().check_budget(request).await
    }

    /// Records the actual cost of a completed execution (§5 `record_cost`).
    pub async fn record_cost(&self, record: CostRecord) {
        self.cost().record_cost(record).await
    }

    /// Looks up the persisted per-stage cost breakdown for one execution.
    pub async fn get_cost_breakdown(&self, execution_id: ExecutionId) -> Result<Option<CostBreakdown>, costctl::CostError> {
        self.cost().get_cost_breakdown(execution_id).await
    }

    /// Summarizes a tenant's spend over the given period (§5 `get_tenant_usage`).
    pub async fn get_tenant_usage(&self, tenant_id: TenantId, period: UsagePeriod) -> UsageSummary {
        self.cost().get_tenant_usage(tenant_id, period).await
    }

    /// Resolves a natural-language action against one tool's registered
    /// operations (§6 `resolve_operation`). Every resolver is scoped to a
    /// single tool, so the tool id is required alongside the action.
    pub async fn resolve_operation(&self, tool_id: ToolId, action: &str, context: &HashMap<String, String>) -> Result<ResolvedOperation, ResolverError> {
        self.context.resolvers().resolve(tool_id, action, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{demo_capabilities, random_tool_id, InMemoryCostRepository, InMemoryEventStore};
    use crate::platform::runtime::{Platform, PlatformDeps};
    use crate::resolver_registry::ResolverRegistry;
    use rtc_types::ExecutionMode;
    use std::collections::HashMap;

    async fn boot_core() -> (RtcCore, crate::platform::runtime::PlatformRuntime) {
        let config = crate::platform::CoreConfig::default();
        let deps = PlatformDeps {
            capabilities: demo_capabilities(),
            events: Arc::new(InMemoryEventStore::new()),
            cost_repository: Arc::new(InMemoryCostRepository::new()),
            resolvers: ResolverRegistry::new(),
            learners: Vec::new(),
        };
        let runtime = Platform::new(config, deps).start().await.expect("platform boots");
        (RtcCore::new(runtime.context()), runtime)
    }

    #[tokio::test]
    async fn executes_a_sync_request_end_to_end() {
        let (core, runtime) = boot_core().await;

        let request = ExecutionRequest::new(random_tool_id(), uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), "read_file", HashMap::new(), ExecutionMode::Sync);
        let response = core.execute(request).await.expect("sync execution succeeds");
        assert!(response.tool_result.is_some());

        runtime.shutdown().await.expect("clean shutdown");
    }

    #[tokio::test]
    async fn reports_zero_usage_for_an_unknown_tenant() {
        let (core, runtime) = boot_core().await;

        let summary = core.get_tenant_usage(uuid::Uuid::new_v4(), UsagePeriod::Daily).await;
        assert_eq!(summary.daily_spend, rtc_types::Money::ZERO);

        runtime.shutdown().await.expect("clean shutdown");
    }
}
