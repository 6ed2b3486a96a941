//! Operation resolution (§4.3): action + context → concrete operation,
//! short-circuiting across four strategies, then falling through cache and
//! learner bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use learner::{cache_key, context_hash, ExternalCache, OperationCache, ResolutionLearner};
use rtc_types::CachedOperation;

use crate::error::ResolverError;
use crate::scope::ResourceScope;
use crate::scorer;
use crate::spec::{extract_verb, ApiOperation, OpenApiIndex};

#[derive(Debug, Clone)]
pub struct ResolvedOperation {
    pub operation_id: String,
    pub path: String,
    pub method: String,
    pub score: i64,
}

fn param_to_resource(name: &str) -> Option<&'static str> {
    match name {
        "owner" | "repo" | "repository" => Some("repos"),
        "issue_number" | "issue" => Some("issues"),
        "pull_number" | "pr_number" => Some("pulls"),
        _ if name.ends_with("_id") || name.ends_with("_number") => None,
        _ => None,
    }
}

const SEPARATORS: &[&str] = &["/", "-", "_", ".", ""];

pub struct Resolver<L2: ExternalCache> {
    index: OpenApiIndex,
    scope: Option<ResourceScope>,
    tool_id: String,
    learner: Arc<ResolutionLearner>,
    cache: Arc<OperationCache<L2>>,
}

impl<L2: ExternalCache> Resolver<L2> {
    pub fn new(
        tool_id: impl Into<String>,
        tool_name: &str,
        operations: Vec<ApiOperation>,
        learner: Arc<ResolutionLearner>,
        cache: Arc<OperationCache<L2>>,
    ) -> Self {
        Self {
            index: OpenApiIndex::build(operations),
            scope: ResourceScope::from_tool_name(tool_name),
            tool_id: tool_id.into(),
            learner,
            cache,
        }
    }

    pub async fn resolve(
        &self,
        action: &str,
        context: &HashMap<String, String>,
    ) -> Result<ResolvedOperation, ResolverError> {
        let hash = context_hash(&context.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
        let key = cache_key(
            &self.tool_id,
            self.scope.as_ref().map(|s| s.resource_type.as_str()),
            action,
            &hash,
        );

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(ResolvedOperation {
                operation_id: cached.operation_id,
                path: cached.path,
                method: cached.method,
                score: cached.score,
            });
        }

        let started = Instant::now();
        let result = self.resolve_uncached(action, context);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(resolved) => {
                let context_params: Vec<String> = context.keys().cloned().collect();
                self.learner
                    .record_success(&self.tool_id, action, &resolved.operation_id, elapsed_ms as f64, &context_params)
                    .await;

                let op = CachedOperation::new(
                    resolved.operation_id.clone(),
                    resolved.path.clone(),
                    resolved.method.clone(),
                    hash,
                    elapsed_ms,
                    resolved.score,
                );
                self.cache.set(&key, op).await;
            }
            Err(_) => {
                self.learner.record_failure(&self.tool_id, action, "<unresolved>", "unresolved").await;
            }
        }

        result
    }

    fn resolve_uncached(
        &self,
        action: &str,
        context: &HashMap<String, String>,
    ) -> Result<ResolvedOperation, ResolverError> {
        if let Some(found) = self.direct_lookup(action) {
            return Ok(found);
        }
        if let Some(found) = self.contextual_composition(action, context) {
            return Ok(found);
        }
        if let Some(found) = self.verb_disambiguation(action, context) {
            return Ok(found);
        }
        if let Some(found) = self.fuzzy_match(action) {
            return Ok(found);
        }

        let mut available = self.index.all_ids();
        available.truncate(20);
        Err(ResolverError::Unresolved { action: action.to_string(), available })
    }

    fn direct_lookup(&self, action: &str) -> Option<ResolvedOperation> {
        let normalized = action.to_lowercase();
        let op_id = self.index.lookup_key(&normalized).or_else(|| self.index.lookup_key(action))?;
        self.to_resolved(op_id, 0)
    }

    fn contextual_composition(&self, action: &str, context: &HashMap<String, String>) -> Option<ResolvedOperation> {
        let mut param_names: Vec<&str> = context.keys().map(String::as_str).collect();
        if let Some(nested) = context.get("parameters") {
            param_names.push(nested.as_str());
        }

        for name in param_names {
            let Some(resource) = param_to_resource(name).map(str::to_string).or_else(|| {
                name.strip_suffix("_id")
                    .or_else(|| name.strip_suffix("_number"))
                    .map(|stem| format!("{stem}s"))
            }) else {
                continue;
            };

            for sep in SEPARATORS {
                let candidate = format!("{resource}{sep}{action}");
                if let Some(op_id) = self.index.lookup_key(&candidate) {
                    return self.to_resolved(op_id, 0);
                }
            }
        }
        None
    }

    fn verb_disambiguation(&self, action: &str, context: &HashMap<String, String>) -> Option<ResolvedOperation> {
        let verb = extract_verb(action)?;
        let candidates = self.index.operations_for_verb(&verb);
        if candidates.is_empty() {
            return None;
        }

        let mut best: Option<(String, i64)> = None;
        for (insertion_index, op_id) in candidates.iter().enumerate() {
            let op = self.index.get(op_id)?;
            let mut s = scorer::score(op, action, Some(&verb), context);

            if let Some(scope) = &self.scope {
                if scope.matches_prefix(op_id) {
                    s += 1000;
                } else if scope.path_patterns.iter().any(|p| op.path.contains(p.as_str())) {
                    s += 50;
                }
            }

            let better = match &best {
                None => true,
                Some((_, best_score)) => s > *best_score,
            };
            if better {
                best = Some((op_id.clone(), s));
            }
            let _ = insertion_index;
        }

        best.map(|(id, score)| {
            let op = self.index.get(&id).expect("candidate came from the index");
            ResolvedOperation { operation_id: id, path: op.path.clone(), method: op.method.clone(), score }
        })
    }

    fn fuzzy_match(&self, action: &str) -> Option<ResolvedOperation> {
        let normalized_variants = [
            action.replace('-', "/"),
            action.replace('_', "/"),
            action.replace('-', "_"),
            action.replace('_', "-"),
        ];
        for variant in normalized_variants.iter() {
            if let Some(op_id) = self.index.lookup_key(variant) {
                return self.to_resolved(op_id, 0);
            }
        }

        let lower = action.to_lowercase();
        self.index
            .all_ids()
            .into_iter()
            .find(|id| id.to_lowercase().contains(&lower))
            .and_then(|id| self.to_resolved(&id, 0))
    }

    fn to_resolved(&self, op_id: &str, score: i64) -> Option<ResolvedOperation> {
        let op = self.index.get(op_id)?;
        Some(ResolvedOperation { operation_id: op_id.to_string(), path: op.path.clone(), method: op.method.clone(), score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct NoopL2;

    #[async_trait::async_trait]
    impl ExternalCache for NoopL2 {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, learner::LearnerError> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), learner::LearnerError> {
            Ok(())
        }
    }

    fn op(id: &str, path: &str, method: &str) -> ApiOperation {
        ApiOperation {
            id: id.to_string(),
            path: path.to_string(),
            method: method.to_string(),
            tags: vec![],
            required_params: vec!["owner".to_string(), "repo".to_string()],
            optional_params: vec![],
            returns_list: false,
        }
    }

    fn resolver(ops: Vec<ApiOperation>, tool_name: &str) -> Resolver<NoopL2> {
        Resolver::new(
            "github",
            tool_name,
            ops,
            Arc::new(ResolutionLearner::new()),
            Arc::new(OperationCache::new(NoopL2)),
        )
    }

    #[tokio::test]
    async fn direct_lookup_resolves_normalized_action() {
        let resolver = resolver(vec![op("repos/get", "/repos/{owner}/{repo}", "GET")], "github_repos");
        let result = resolver.resolve("repos/get", &HashMap::new()).await.unwrap();
        assert_eq!(result.operation_id, "repos/get");
    }

    #[tokio::test]
    async fn verb_disambiguation_prefers_resource_scope_match() {
        let ops = vec![
            op("repos/get", "/repos/{owner}/{repo}", "GET"),
            op("users/get", "/users/{username}", "GET"),
        ];
        let resolver = resolver(ops, "github_repos");
        let mut context = HashMap::new();
        context.insert("owner".to_string(), "octocat".to_string());
        context.insert("repo".to_string(), "hello".to_string());
        let result = resolver.resolve("get", &context).await.unwrap();
        assert_eq!(result.operation_id, "repos/get");
    }

    #[tokio::test]
    async fn unresolved_action_lists_available_operations() {
        let resolver = resolver(vec![op("repos/get", "/repos/{owner}/{repo}", "GET")], "github_repos");
        let err = resolver.resolve("totally-unknown-verb", &HashMap::new()).await.unwrap_err();
        match err {
            ResolverError::Unresolved { available, .. } => assert!(!available.is_empty()),
        }
    }
}
