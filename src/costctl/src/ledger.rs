//! The in-memory spend ledger (§3 SpendLedger): two maps keyed by
//! `(tenant_id, "YYYY-MM-DD")` and `(tenant_id, "YYYY-MM")`, mutated only
//! through compute-if-absent-add so concurrent executions never race each
//! other into a lost update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rtc_types::{Money, TenantId};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct SpendLedger {
    daily: RwLock<HashMap<(TenantId, String), Money>>,
    monthly: RwLock<HashMap<(TenantId, String), Money>>,
}

impl SpendLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly increases both the day and month entries for `tenant_id`
    /// by `amount`; returns the new daily total.
    pub async fn add(&self, tenant_id: TenantId, amount: Money, at: DateTime<Utc>) -> Money {
        let day_key = (tenant_id, at.format("%Y-%m-%d").to_string());
        let month_key = (tenant_id, at.format("%Y-%m").to_string());

        let mut monthly = self.monthly.write().await;
        *monthly.entry(month_key).or_insert(Money::ZERO) += amount;
        drop(monthly);

        let mut daily = self.daily.write().await;
        let entry = daily.entry(day_key).or_insert(Money::ZERO);
        *entry += amount;
        *entry
    }

    pub async fn current_daily_spend(&self, tenant_id: TenantId, at: DateTime<Utc>) -> Money {
        let day_key = (tenant_id, at.format("%Y-%m-%d").to_string());
        self.daily.read().await.get(&day_key).copied().unwrap_or(Money::ZERO)
    }

    pub async fn current_monthly_spend(&self, tenant_id: TenantId, at: DateTime<Utc>) -> Money {
        let month_key = (tenant_id, at.format("%Y-%m").to_string());
        self.monthly.read().await.get(&month_key).copied().unwrap_or(Money::ZERO)
    }

    /// Prunes daily entries older than `retention_days` and monthly entries
    /// older than 12 months. Returns the number of entries removed.
    pub async fn sweep(&self, now: DateTime<Utc>, retention_days: i64) -> usize {
        let daily_cutoff = now - chrono::Duration::days(retention_days);
        let monthly_cutoff = now - chrono::Duration::days(365);

        let mut daily = self.daily.write().await;
        let before_daily = daily.len();
        daily.retain(|(_, date), _| {
            DateTime::parse_from_rfc3339(&format!("{date}T00:00:00Z"))
                .map(|d| d.with_timezone(&Utc) >= daily_cutoff)
                .unwrap_or(true)
        });
        let removed_daily = before_daily - daily.len();
        drop(daily);

        let mut monthly = self.monthly.write().await;
        let before_monthly = monthly.len();
        monthly.retain(|(_, month), _| {
            DateTime::parse_from_rfc3339(&format!("{month}-01T00:00:00Z"))
                .map(|d| d.with_timezone(&Utc) >= monthly_cutoff)
                .unwrap_or(true)
        });
        removed_daily + (before_monthly - monthly.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn add_is_strictly_increasing() {
        let ledger = SpendLedger::new();
        let tenant = Uuid::new_v4();
        let now = Utc::now();
        ledger.add(tenant, Money::new(100, 2), now).await;
        let after_second = ledger.add(tenant, Money::new(50, 2), now).await;
        assert_eq!(after_second, Money::new(150, 2));
    }

    #[tokio::test]
    async fn daily_and_monthly_are_tracked_independently() {
        let ledger = SpendLedger::new();
        let tenant = Uuid::new_v4();
        let now = Utc::now();
        ledger.add(tenant, Money::new(100, 2), now).await;
        assert_eq!(ledger.current_daily_spend(tenant, now).await, Money::new(100, 2));
        assert_eq!(ledger.current_monthly_spend(tenant, now).await, Money::new(100, 2));
    }
}
