//! Backs the `resolve_operation` exposed operation (§6) by keeping one
//! `execution::OperationResolver` per registered tool — the resolver itself
//! is constructed per-tool (it owns that tool's OpenAPI index and resource
//! scope), so resolution always needs both a tool id and an action.

use std::collections::HashMap;
use std::sync::Arc;

use execution::OperationResolver;
use resolver::{ResolvedOperation, ResolverError};
use rtc_types::ToolId;

#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<ToolId, Arc<dyn OperationResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool_id: ToolId, resolver: Arc<dyn OperationResolver>) {
        self.resolvers.insert(tool_id, resolver);
    }

    pub async fn resolve(&self, tool_id: ToolId, action: &str, context: &HashMap<String, String>) -> Result<ResolvedOperation, ResolverError> {
        match self.resolvers.get(&tool_id) {
            Some(resolver) => resolver.resolve(action, context).await,
            None => Err(ResolverError::Unresolved { action: action.to_string(), available: Vec::new() }),
        }
    }
}
