//! Boots the core in-process with the in-memory capability stand-ins and
//! drives a handful of executions through it, one per mode, printing the
//! responses and the resulting Prometheus metrics. There is no HTTP
//! surface here (§6 drops the gateway binaries) — this is a local smoke
//! test, not a server.

use std::collections::HashMap;
use std::sync::Arc;

use rtc_core::memory::{demo_capabilities, random_tool_id, InMemoryCostRepository, InMemoryEventStore};
use rtc_core::platform::runtime::{Platform, PlatformDeps};
use rtc_core::platform::{metrics_registry, CoreConfig};
use rtc_core::resolver_registry::ResolverRegistry;
use rtc_core::RtcCore;
use rtc_types::{ExecutionMode, ExecutionRequest};
use tracing::info;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = CoreConfig::default();
    let deps = PlatformDeps {
        capabilities: demo_capabilities(),
        events: Arc::new(InMemoryEventStore::new()),
        cost_repository: Arc::new(InMemoryCostRepository::new()),
        resolvers: ResolverRegistry::new(),
        learners: Vec::new(),
    };

    let runtime = Platform::new(config, deps).start().await?;
    let core = RtcCore::new(runtime.context());

    let tenant_id = Uuid::new_v4();
    let agent_id = Uuid::new_v4();
    let tool_id = random_tool_id();

    for mode in [ExecutionMode::Sync, ExecutionMode::Hybrid, ExecutionMode::Async] {
        let request = ExecutionRequest::new(tool_id, agent_id, tenant_id, "read_file", HashMap::new(), mode);
        match core.execute(request).await {
            Ok(response) => info!(?mode, execution_id = %response.execution_id, "execution completed"),
            Err(err) => info!(?mode, error = %err, "execution rejected"),
        }
    }

    let usage = core.get_tenant_usage(tenant_id, rtc_types::UsagePeriod::Daily).await;
    info!(?usage, "tenant usage after demo run");

    println!("{}", metrics_registry().render()?);

    runtime.shutdown().await
}
