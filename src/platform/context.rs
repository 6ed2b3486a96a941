use std::sync::Arc;

use costctl::CostController;
use execution::ExecutionService;
use tokio_util::sync::CancellationToken;

use crate::platform::config::CoreConfig;
use crate::resolver_registry::ResolverRegistry;

#[derive(Clone)]
pub struct PlatformContext {
    shared: Arc<SharedState>,
    shutdown: CancellationToken,
}

struct SharedState {
    config: CoreConfig,
    execution: Arc<ExecutionService>,
    cost: Arc<CostController>,
    resolvers: Arc<ResolverRegistry>,
}

impl PlatformContext {
    pub(crate) fn new(
        config: CoreConfig,
        execution: Arc<ExecutionService>,
        cost: Arc<CostController>,
        resolvers: Arc<ResolverRegistry>,
        shutdown: CancellationToken,
    ) -> Self {
        let shared = SharedState { config, execution, cost, resolvers };

        Self { shared: Arc::new(shared), shutdown }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.shared.config
    }

    pub fn execution(&self) -> Arc<ExecutionService> {
        Arc::clone(&self.shared.execution)
    }

    pub fn cost(&self) -> Arc<CostController> {
        Arc::clone(&self.shared.cost)
    }

    pub fn resolvers(&self) -> Arc<ResolverRegistry> {
        Arc::clone(&self.shared.resolvers)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
