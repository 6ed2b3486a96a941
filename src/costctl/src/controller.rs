//! The cost controller (§4.2): the authoritative view of per-tenant spend
//! and the decision of whether a prospective operation fits inside it.

use std::sync::Arc;

use chrono::Utc;
use pricing::{apply_discount, RateTable};
use rtc_types::{
    AlertLevel, CostAlert, CostBreakdown, CostCheckRequest, CostCheckResponse, CostRecord, Money, TenantId,
    UsagePeriod, UsageSummary,
};
use tokio::sync::mpsc;

use crate::budget::BudgetCache;
use crate::ledger::SpendLedger;
use crate::repository::CostRepository;

const ALERT_CHANNEL_CAPACITY: usize = 100;
const CRITICAL_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingGranularity {
    Execution,
    Hourly,
    Daily,
}

#[derive(Debug, Clone, Copy)]
pub struct CostConfig {
    pub global_daily_limit: Money,
    pub global_monthly_limit: Money,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub strict_enforcement: bool,
    pub grace_period_minutes: u32,
    pub retention_days: i64,
    pub tracking_granularity: TrackingGranularity,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            global_daily_limit: Money::new(100000, 2),
            global_monthly_limit: Money::new(2000000, 2),
            warning_threshold: 0.8,
            critical_threshold: CRITICAL_THRESHOLD,
            strict_enforcement: true,
            grace_period_minutes: 0,
            retention_days: 90,
            tracking_granularity: TrackingGranularity::Execution,
        }
    }
}

pub struct CostController {
    config: CostConfig,
    rates: RateTable,
    ledger: SpendLedger,
    budgets: BudgetCache,
    repository: Arc<dyn CostRepository>,
    alert_tx: mpsc::Sender<CostAlert>,
    pub alert_rx: tokio::sync::Mutex<Option<mpsc::Receiver<CostAlert>>>,
}

impl CostController {
    pub fn new(config: CostConfig, rates: RateTable, repository: Arc<dyn CostRepository>) -> Self {
        let (alert_tx, alert_rx) = mpsc::channel(ALERT_CHANNEL_CAPACITY);
        Self {
            config,
            rates,
            ledger: SpendLedger::new(),
            budgets: BudgetCache::new(repository.clone()),
            repository,
            alert_tx,
            alert_rx: tokio::sync::Mutex::new(Some(alert_rx)),
        }
    }

    pub fn estimate_cost(&self, req: &CostCheckRequest, discount_percent: f64) -> Money {
        let raw = self.rates.tool_rate(&req.tool_type)
            + self.rates.embedding_cost(req.embedding_tokens)
            + self.rates.analysis_cost(req.analysis_tokens)
            + self.rates.storage_cost(req.storage_mb);
        apply_discount(raw, discount_percent)
    }

    pub async fn check_budget(&self, req: CostCheckRequest) -> CostCheckResponse {
        let budget = self.budgets.get(req.tenant_id).await;
        let estimated_cost = self.estimate_cost(&req, budget.discount_percent);

        let now = Utc::now();
        let current = self.ledger.current_daily_spend(req.tenant_id, now).await;
        let remaining = budget.daily_limit - current;
        let would_exceed = remaining < estimated_cost;
        let percent_used = pricing::arithmetic::percent_used(current, budget.daily_limit);

        if percent_used >= budget.warning_percent {
            self.emit_alert(CostAlert {
                tenant_id: req.tenant_id,
                level: AlertLevel::Warning,
                percent_used,
                current_spend: current,
                limit: budget.daily_limit,
                timestamp: now,
            });
        }

        let mut grace_period = false;
        let mut allowed = true;
        let mut reason = None;

        if would_exceed && self.config.strict_enforcement {
            grace_period = self.repository.is_in_grace_period(req.tenant_id).await.unwrap_or(false);
            if !grace_period {
                allowed = false;
                reason = Some("Daily budget would be exceeded".to_string());
            }
        }

        CostCheckResponse { allowed, estimated_cost, remaining, percent_used, would_exceed, grace_period, reason }
    }

    pub async fn record_cost(&self, record: CostRecord) {
        let raw_sum = record.tool_cost + record.embedding_cost + record.analysis_cost + record.storage_cost;
        let discount = raw_sum - apply_discount(raw_sum, record.discount_percent);

        let breakdown = CostBreakdown::new(
            record.execution_id,
            record.tenant_id,
            record.tool_cost,
            record.embedding_cost,
            record.analysis_cost,
            record.storage_cost,
            discount,
        );

        self.ledger.add(record.tenant_id, breakdown.total, breakdown.timestamp).await;

        if let Err(e) = self.repository.store_cost(&breakdown).await {
            tracing::warn!(error = %e, execution_id = %record.execution_id, "failed to persist cost breakdown");
        }

        let budget = self.budgets.get(record.tenant_id).await;
        let current = self.ledger.current_daily_spend(record.tenant_id, breakdown.timestamp).await;
        let percent_used = pricing::arithmetic::percent_used(current, budget.daily_limit);

        if percent_used >= self.config.critical_threshold {
            self.emit_alert(CostAlert {
                tenant_id: record.tenant_id,
                level: AlertLevel::Critical,
                percent_used,
                current_spend: current,
                limit: budget.daily_limit,
                timestamp: breakdown.timestamp,
            });
        } else if percent_used >= self.config.warning_threshold {
            self.emit_alert(CostAlert {
                tenant_id: record.tenant_id,
                level: AlertLevel::Warning,
                percent_used,
                current_spend: current,
                limit: budget.daily_limit,
                timestamp: breakdown.timestamp,
            });
        }
    }

    pub async fn get_tenant_usage(&self, tenant_id: TenantId, period: UsagePeriod) -> UsageSummary {
        match self.repository.get_usage_breakdown(tenant_id, period).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, %tenant_id, "usage breakdown unavailable, returning a minimal summary");
                UsageSummary {
                    tenant_id,
                    period,
                    daily_spend: Money::ZERO,
                    monthly_spend: Money::ZERO,
                    trends: Default::default(),
                    top_operations: Vec::new(),
                    recommendations: vec!["usage data temporarily unavailable".to_string()],
                }
            }
        }
    }

    /// Looks up the persisted per-stage breakdown for one execution (§6
    /// "get_cost_breakdown"); `None` if the execution never reached the
    /// persistence stage or its record has already been swept.
    pub async fn get_cost_breakdown(&self, execution_id: rtc_types::ExecutionId) -> Result<Option<CostBreakdown>, crate::error::CostError> {
        self.repository.get_cost_breakdown(execution_id).await
    }

    pub async fn refresh_budgets(&self) -> usize {
        self.budgets.refresh_all().await
    }

    pub async fn sweep_ledger(&self) -> usize {
        self.ledger.sweep(Utc::now(), self.config.retention_days).await
    }

    pub async fn repository_store_alert(&self, alert: &CostAlert) -> Result<(), crate::error::CostError> {
        self.repository.store_alert(alert).await
    }

    /// The tenant's configured discount, for callers assembling a `CostRecord`
    /// outside `check_budget` (e.g. the execution pipeline's persistence stage).
    pub async fn tenant_discount_percent(&self, tenant_id: TenantId) -> f64 {
        self.budgets.get(tenant_id).await.discount_percent
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    fn emit_alert(&self, alert: CostAlert) {
        if self.alert_tx.try_send(alert).is_err() {
            tracing::warn!("alert channel saturated, dropping alert");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct StubRepository;

    #[async_trait::async_trait]
    impl CostRepository for StubRepository {
        async fn store_cost(&self, _breakdown: &CostBreakdown) -> Result<(), crate::error::CostError> {
            Ok(())
        }
        async fn get_cost_breakdown(
            &self,
            _execution_id: rtc_types::ExecutionId,
        ) -> Result<Option<CostBreakdown>, crate::error::CostError> {
            Ok(None)
        }
        async fn get_usage_breakdown(
            &self,
            tenant_id: TenantId,
            period: UsagePeriod,
        ) -> Result<UsageSummary, crate::error::CostError> {
            Ok(UsageSummary {
                tenant_id,
                period,
                daily_spend: Money::ZERO,
                monthly_spend: Money::ZERO,
                trends: Default::default(),
                top_operations: vec![],
                recommendations: vec![],
            })
        }
        async fn get_tenant_budget(&self, _tenant_id: TenantId) -> Result<Option<rtc_types::TenantBudget>, crate::error::CostError> {
            Ok(None)
        }
        async fn get_all_tenant_budgets(&self) -> Result<Vec<rtc_types::TenantBudget>, crate::error::CostError> {
            Ok(vec![])
        }
        async fn is_in_grace_period(&self, _tenant_id: TenantId) -> Result<bool, crate::error::CostError> {
            Ok(false)
        }
        async fn store_alert(&self, _alert: &CostAlert) -> Result<(), crate::error::CostError> {
            Ok(())
        }
    }

    struct GracePeriodRepository;

    #[async_trait::async_trait]
    impl CostRepository for GracePeriodRepository {
        async fn store_cost(&self, _breakdown: &CostBreakdown) -> Result<(), crate::error::CostError> {
            Ok(())
        }
        async fn get_cost_breakdown(
            &self,
            _execution_id: rtc_types::ExecutionId,
        ) -> Result<Option<CostBreakdown>, crate::error::CostError> {
            Ok(None)
        }
        async fn get_usage_breakdown(
            &self,
            tenant_id: TenantId,
            period: UsagePeriod,
        ) -> Result<UsageSummary, crate::error::CostError> {
            Ok(UsageSummary {
                tenant_id,
                period,
                daily_spend: Money::ZERO,
                monthly_spend: Money::ZERO,
                trends: Default::default(),
                top_operations: vec![],
                recommendations: vec![],
            })
        }
        async fn get_tenant_budget(&self, _tenant_id: TenantId) -> Result<Option<rtc_types::TenantBudget>, crate::error::CostError> {
            Ok(None)
        }
        async fn get_all_tenant_budgets(&self) -> Result<Vec<rtc_types::TenantBudget>, crate::error::CostError> {
            Ok(vec![])
        }
        async fn is_in_grace_period(&self, _tenant_id: TenantId) -> Result<bool, crate::error::CostError> {
            Ok(true)
        }
        async fn store_alert(&self, _alert: &CostAlert) -> Result<(), crate::error::CostError> {
            Ok(())
        }
    }

    fn controller() -> CostController {
        CostController::new(CostConfig::default(), RateTable::default(), Arc::new(StubRepository))
    }

    fn controller_with_grace_period() -> CostController {
        CostController::new(CostConfig::default(), RateTable::default(), Arc::new(GracePeriodRepository))
    }

    #[tokio::test]
    async fn strict_budget_blocks_when_would_exceed() {
        let controller = controller();
        let tenant = Uuid::new_v4();
        let req = CostCheckRequest {
            tenant_id: tenant,
            tool_id: Uuid::new_v4(),
            tool_type: "compute_intensive".to_string(),
            embedding_tokens: 10_000_000_000,
            analysis_tokens: 0,
            storage_mb: 0.0,
        };
        let response = controller.check_budget(req).await;
        assert!(response.would_exceed);
        assert!(!response.allowed);
        assert_eq!(response.reason.as_deref(), Some("Daily budget would be exceeded"));
    }

    #[tokio::test]
    async fn grace_period_overrides_a_would_exceed_block() {
        let controller = controller_with_grace_period();
        let req = CostCheckRequest {
            tenant_id: Uuid::new_v4(),
            tool_id: Uuid::new_v4(),
            tool_type: "compute_intensive".to_string(),
            embedding_tokens: 10_000_000_000,
            analysis_tokens: 0,
            storage_mb: 0.0,
        };
        let response = controller.check_budget(req).await;
        assert!(response.would_exceed);
        assert!(response.allowed);
        assert!(response.grace_period);
    }

    #[tokio::test]
    async fn modest_request_is_allowed() {
        let controller = controller();
        let req = CostCheckRequest {
            tenant_id: Uuid::new_v4(),
            tool_id: Uuid::new_v4(),
            tool_type: "http_get".to_string(),
            embedding_tokens: 1000,
            analysis_tokens: 0,
            storage_mb: 0.0,
        };
        let response = controller.check_budget(req).await;
        assert!(response.allowed);
        assert!(!response.would_exceed);
    }

    #[tokio::test]
    async fn record_cost_strictly_increases_spend() {
        let controller = controller();
        let tenant = Uuid::new_v4();
        let record = CostRecord {
            execution_id: Uuid::new_v4(),
            tenant_id: tenant,
            tool_cost: Money::new(100, 2),
            embedding_cost: Money::ZERO,
            analysis_cost: Money::ZERO,
            storage_cost: Money::ZERO,
            discount_percent: 0.0,
            timestamp: Utc::now(),
        };
        controller.record_cost(record).await;
        let spend = controller.ledger.current_daily_spend(tenant, Utc::now()).await;
        assert_eq!(spend, Money::new(100, 2));
    }
}
