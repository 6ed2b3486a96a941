//! Bridges the per-tool, generic `resolver::Resolver<L2>` to a single
//! object-safe trait the execution service can hold one of per registered
//! tool, backing the `resolve_operation(action, context)` exposed operation
//! (§6). Stage 3 itself does not call this — it delegates to `ToolExecutor`
//! directly per §4.1's stage contract — this only serves the separate
//! exposed resolution operation.

use std::collections::HashMap;

use async_trait::async_trait;
use learner::ExternalCache;
use resolver::{ResolvedOperation, Resolver, ResolverError};

#[async_trait]
pub trait OperationResolver: Send + Sync {
    async fn resolve(&self, action: &str, context: &HashMap<String, String>) -> Result<ResolvedOperation, ResolverError>;
}

#[async_trait]
impl<L2: ExternalCache + 'static> OperationResolver for Resolver<L2> {
    async fn resolve(&self, action: &str, context: &HashMap<String, String>) -> Result<ResolvedOperation, ResolverError> {
        Resolver::resolve(self, action, context).await
    }
}
