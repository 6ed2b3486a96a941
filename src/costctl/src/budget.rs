//! Read-mostly budget cache (§5 shared-resource policy: "Budget cache is
//! read-mostly with a periodic writer; stale reads up to 5 minutes are
//! acceptable"). The cache is authoritative for admission; the repository
//! is the source of truth, refreshed every 5 minutes by a background
//! worker.

use std::collections::HashMap;
use std::sync::Arc;

use rtc_types::{TenantBudget, TenantId};
use tokio::sync::RwLock;

use crate::repository::CostRepository;

pub struct BudgetCache {
    budgets: RwLock<HashMap<TenantId, TenantBudget>>,
    repository: Arc<dyn CostRepository>,
}

impl BudgetCache {
    pub fn new(repository: Arc<dyn CostRepository>) -> Self {
        Self { budgets: RwLock::new(HashMap::new()), repository }
    }

    /// Loads on first touch; materialises a default budget if the tenant
    /// has no persisted record.
    pub async fn get(&self, tenant_id: TenantId) -> TenantBudget {
        if let Some(budget) = self.budgets.read().await.get(&tenant_id) {
            return budget.clone();
        }

        let budget = self
            .repository
            .get_tenant_budget(tenant_id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| TenantBudget::default_for(tenant_id));

        self.budgets.write().await.insert(tenant_id, budget.clone());
        budget
    }

    /// Reloads every tenant's budget from the repository. Run every 5
    /// minutes by `workers::budget_refresher`.
    pub async fn refresh_all(&self) -> usize {
        match self.repository.get_all_tenant_budgets().await {
            Ok(budgets) => {
                let count = budgets.len();
                let mut cache = self.budgets.write().await;
                for budget in budgets {
                    cache.insert(budget.tenant_id, budget);
                }
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, "budget refresh failed, keeping stale cache");
                0
            }
        }
    }
}
