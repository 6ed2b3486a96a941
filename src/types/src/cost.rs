//! Monetary data shapes shared by the pricing table, the cost controller,
//! and the execution pipeline.
//!
//! All money is fixed-point decimal (`rust_decimal::Decimal`, 28-29
//! significant digits) so that totals are exact and independent of operand
//! order. Never use `f32`/`f64` for a quantity that ends up in a
//! `CostBreakdown`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{ExecutionId, TenantId, ToolId};

pub type Money = Decimal;

/// Hot cache of a tenant's persisted budget record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantBudget {
    pub tenant_id: TenantId,
    pub daily_limit: Money,
    pub monthly_limit: Money,
    /// Fraction of `daily_limit`, in `[0, 1]`, at which a warning alert fires.
    pub warning_percent: f64,
    /// `[0, 100]`; applied as `cost * (1 - discount_percent / 100)`.
    pub discount_percent: f64,
    pub grace_period_minutes: u32,
}

impl TenantBudget {
    pub fn default_for(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            daily_limit: Money::new(10000, 2),   // $100.00
            monthly_limit: Money::new(200000, 2), // $2000.00
            warning_percent: 0.8,
            discount_percent: 0.0,
            grace_period_minutes: 0,
        }
    }
}

/// The cost breakdown for a single execution. Invariant:
/// `total == tool + embedding + analysis + storage - discount`, exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub execution_id: ExecutionId,
    pub tenant_id: TenantId,
    pub timestamp: DateTime<Utc>,
    pub tool_cost: Money,
    pub embedding_cost: Money,
    pub analysis_cost: Money,
    pub storage_cost: Money,
    pub discount: Money,
    pub total: Money,
}

impl CostBreakdown {
    pub fn new(
        execution_id: ExecutionId,
        tenant_id: TenantId,
        tool_cost: Money,
        embedding_cost: Money,
        analysis_cost: Money,
        storage_cost: Money,
        discount: Money,
    ) -> Self {
        let total = tool_cost + embedding_cost + analysis_cost + storage_cost - discount;
        Self {
            execution_id,
            tenant_id,
            timestamp: Utc::now(),
            tool_cost,
            embedding_cost,
            analysis_cost,
            storage_cost,
            discount,
            total,
        }
    }
}

/// What `check_budget` is asked to price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCheckRequest {
    pub tenant_id: TenantId,
    pub tool_id: ToolId,
    pub tool_type: String,
    pub embedding_tokens: u64,
    pub analysis_tokens: u64,
    pub storage_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostCheckResponse {
    pub allowed: bool,
    pub estimated_cost: Money,
    pub remaining: Money,
    pub percent_used: f64,
    pub would_exceed: bool,
    pub grace_period: bool,
    pub reason: Option<String>,
}

/// The ledger input produced once an execution's actual costs are known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRecord {
    pub execution_id: ExecutionId,
    pub tenant_id: TenantId,
    pub tool_cost: Money,
    pub embedding_cost: Money,
    pub analysis_cost: Money,
    pub storage_cost: Money,
    pub discount_percent: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAlert {
    pub tenant_id: TenantId,
    pub level: AlertLevel,
    pub percent_used: f64,
    pub current_spend: Money,
    pub limit: Money,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsagePeriod {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageTrends {
    pub daily_growth_percent: f64,
    pub weekly_growth_percent: f64,
    pub monthly_growth_percent: f64,
    pub peak_hour: u8,
    pub peak_day: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSummary {
    pub tenant_id: TenantId,
    pub period: UsagePeriod,
    pub daily_spend: Money,
    pub monthly_spend: Money,
    pub trends: UsageTrends,
    pub top_operations: Vec<(String, Money)>,
    pub recommendations: Vec<String>,
}
