//! Background workers the cost controller owns for its lifetime: alert
//! processor, budget refresher, ledger sweeper. Every worker takes a
//! `CancellationToken` and returns once it's cancelled, so the platform's
//! shutdown routine can drain them deterministically.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::controller::CostController;

const BUDGET_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Drains the alert channel, writing every alert to the repository and the
/// log. Exits once the channel closes or cancellation fires.
pub async fn alert_processor(controller: Arc<CostController>, cancel: CancellationToken) {
    let mut rx = match controller.alert_rx.lock().await.take() {
        Some(rx) => rx,
        None => {
            tracing::warn!("alert_processor started twice; receiver already taken");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            maybe_alert = rx.recv() => {
                match maybe_alert {
                    Some(alert) => {
                        tracing::warn!(tenant_id = %alert.tenant_id, level = ?alert.level, percent_used = alert.percent_used, "cost alert");
                        if let Err(e) = controller.repository_store_alert(&alert).await {
                            tracing::warn!(error = %e, "failed to persist cost alert");
                        }
                    }
                    None => break,
                }
            }
        }
    }
}

pub async fn budget_refresher(controller: Arc<CostController>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(BUDGET_REFRESH_INTERVAL);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let count = controller.refresh_budgets().await;
                tracing::debug!(tenant_count = count, "refreshed tenant budgets");
            }
        }
    }
}

pub async fn ledger_sweeper(controller: Arc<CostController>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let removed = controller.sweep_ledger().await;
                tracing::debug!(removed, "swept stale ledger entries");
            }
        }
    }
}
