use std::sync::Arc;

use anyhow::Result;
use costctl::{CostController, CostRepository};
use execution::{Capabilities, EventStore, ExecutionService, Pipeline};
use learner::{PruneConfig, ResolutionLearner};
use security::SecurityValidator;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::platform::config::CoreConfig;
use crate::platform::context::PlatformContext;
use crate::platform::service::ServiceRegistration;
use crate::resolver_registry::ResolverRegistry;

/// External collaborators the platform can't construct itself — supplied
/// by whatever embeds the core (the demo binary, or a real deployment
/// wiring real HTTP clients and stores behind these traits).
pub struct PlatformDeps {
    pub capabilities: Capabilities,
    pub events: Arc<dyn EventStore>,
    pub cost_repository: Arc<dyn CostRepository>,
    pub resolvers: ResolverRegistry,
    /// One learner per registered resolver (§4.5) — pruned periodically by
    /// the resolver-cache-sweeper background worker.
    pub learners: Vec<Arc<ResolutionLearner>>,
}

pub struct Platform {
    config: CoreConfig,
    deps: PlatformDeps,
    services: Vec<ServiceRegistration>,
}

impl Platform {
    pub fn new(config: CoreConfig, deps: PlatformDeps) -> Self {
        Self { config, deps, services: Vec::new() }
    }

    pub fn register_service(&mut self, service: ServiceRegistration) {
        self.services.push(service);
    }

    pub async fn start(self) -> Result<PlatformRuntime> {
        initialize_logging(&self.config);

        let security = Arc::new(SecurityValidator::new(self.config.to_security_config()));
        let cost = Arc::new(CostController::new(self.config.to_cost_config(), pricing::RateTable::default(), self.deps.cost_repository));
        let execution_config = self.config.to_execution_config();
        let pipeline = Arc::new(Pipeline::new(
            self.deps.capabilities,
            security,
            Arc::clone(&cost),
            self.config.execution.slo_target_ms,
            execution_config.cache_enabled,
            execution_config.cache_ttl,
        ));
        let execution = Arc::new(ExecutionService::new(
            self.config.to_execution_config(),
            self.config.to_admission_config(),
            pipeline,
            self.deps.events,
        ));

        let root_token = CancellationToken::new();
        let context = PlatformContext::new(self.config, execution, Arc::clone(&cost), Arc::new(self.deps.resolvers), root_token.child_token());

        let mut tasks = Vec::new();
        let mut services = self.services;
        services.push(alert_processor_service(Arc::clone(&cost)));
        services.push(budget_refresher_service(Arc::clone(&cost)));
        services.push(ledger_sweeper_service(cost));
        if !self.deps.learners.is_empty() {
            services.push(resolver_cache_sweeper_service(self.deps.learners));
        }

        for service in services {
            let handle = service.spawn(context.clone(), root_token.child_token());
            tasks.push((service.name().to_string(), handle));
        }

        info!("platform boot completed");

        Ok(PlatformRuntime { context, cancel_token: root_token, tasks })
    }
}

pub struct PlatformRuntime {
    context: PlatformContext,
    cancel_token: CancellationToken,
    tasks: Vec<(String, JoinHandle<Result<()>>)>,
}

impl PlatformRuntime {
    pub fn context(&self) -> PlatformContext {
        self.context.clone()
    }

    pub async fn shutdown(self) -> Result<()> {
        self.cancel_token.cancel();

        for (name, handle) in self.tasks {
            match handle.await {
                Ok(Ok(())) => info!(service = %name, "service shutdown cleanly"),
                Ok(Err(err)) => return Err(err),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

fn initialize_logging(config: &CoreConfig) {
    let filter = &config.observability.log_level;
    let _ = tracing_subscriber::fmt().with_env_filter(filter.as_str()).try_init();
}

fn alert_processor_service(controller: Arc<CostController>) -> ServiceRegistration {
    ServiceRegistration::new(
        "cost-alert-processor",
        Arc::new(move |_ctx, token: CancellationToken| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                costctl::workers::alert_processor(controller, token).await;
                let outcome: Result<()> = Ok(());
                outcome
            })
        }),
    )
}

fn budget_refresher_service(controller: Arc<CostController>) -> ServiceRegistration {
    ServiceRegistration::new(
        "cost-budget-refresher",
        Arc::new(move |_ctx, token: CancellationToken| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                costctl::workers::budget_refresher(controller, token).await;
                let outcome: Result<()> = Ok(());
                outcome
            })
        }),
    )
}

fn ledger_sweeper_service(controller: Arc<CostController>) -> ServiceRegistration {
    ServiceRegistration::new(
        "cost-ledger-sweeper",
        Arc::new(move |_ctx, token: CancellationToken| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move {
                costctl::workers::ledger_sweeper(controller, token).await;
                let outcome: Result<()> = Ok(());
                outcome
            })
        }),
    )
}

const RESOLVER_PRUNE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Prunes every registered resolver's learner on the same cadence as the
/// cost ledger sweep, mirroring `costctl::workers::ledger_sweeper`'s
/// tick-or-cancel loop shape.
fn resolver_cache_sweeper_service(learners: Vec<Arc<ResolutionLearner>>) -> ServiceRegistration {
    ServiceRegistration::new(
        "resolver-cache-sweeper",
        Arc::new(move |_ctx, token: CancellationToken| {
            let learners = learners.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(RESOLVER_PRUNE_INTERVAL);
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            for learner in &learners {
                                let removed = learner.prune(PruneConfig::default()).await;
                                tracing::debug!(removed, "pruned stale resolution records");
                            }
                        }
                    }
                }
                let outcome: Result<()> = Ok(());
                outcome
            })
        }),
    )
}
