//! The `CostRepository` capability (§6), narrowed to what the controller
//! itself calls. The concrete implementation (a real database, or an
//! in-memory stand-in for tests/demo) lives outside this crate.

use async_trait::async_trait;
use rtc_types::{CostAlert, CostBreakdown, ExecutionId, TenantBudget, TenantId, UsagePeriod, UsageSummary};

use crate::error::CostError;

#[async_trait]
pub trait CostRepository: Send + Sync {
    async fn store_cost(&self, breakdown: &CostBreakdown) -> Result<(), CostError>;
    async fn get_cost_breakdown(&self, execution_id: ExecutionId) -> Result<Option<CostBreakdown>, CostError>;
    async fn get_usage_breakdown(&self, tenant_id: TenantId, period: UsagePeriod) -> Result<UsageSummary, CostError>;
    async fn get_tenant_budget(&self, tenant_id: TenantId) -> Result<Option<TenantBudget>, CostError>;
    async fn get_all_tenant_budgets(&self) -> Result<Vec<TenantBudget>, CostError>;
    async fn is_in_grace_period(&self, tenant_id: TenantId) -> Result<bool, CostError>;
    async fn store_alert(&self, alert: &CostAlert) -> Result<(), CostError>;
}
