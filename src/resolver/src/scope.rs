//! Resource-scope derivation and filtering (§4.6). A tool named
//! `{vendor}_{resource}` is restricted to operations on that one resource
//! family; this module derives the scope and scores operations against it.

use std::collections::HashMap;

use crate::spec::ApiOperation;

fn secondary_resources(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        "issues" => &["comments", "labels", "milestones", "assignees"],
        "pulls" | "pull_requests" => &["reviews", "comments", "commits", "files"],
        "repos" => &["branches", "tags", "contents", "releases"],
        _ => &[],
    }
}

/// `{singular}` by simple suffix rules: `ies→y`, `es→∅`, `s→∅`.
pub fn singularize(resource_type: &str) -> String {
    if let Some(stem) = resource_type.strip_suffix("ies") {
        format!("{stem}y")
    } else if resource_type.ends_with("es") && resource_type.len() > 2 {
        resource_type[..resource_type.len() - 2].to_string()
    } else if let Some(stem) = resource_type.strip_suffix('s') {
        stem.to_string()
    } else {
        resource_type.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ResourceScope {
    pub resource_type: String,
    pub singular: String,
    pub path_patterns: Vec<String>,
    pub operation_prefixes: Vec<String>,
    pub required_tags: Vec<String>,
}

impl ResourceScope {
    /// Derives a scope from a tool name of the form `{vendor}_{resource}`.
    pub fn from_tool_name(tool_name: &str) -> Option<Self> {
        let resource_type = tool_name.rsplit('_').next()?.to_string();
        if resource_type == tool_name {
            return None;
        }
        let singular = singularize(&resource_type);

        let path_patterns = vec![
            format!("/{resource_type}"),
            format!("/{resource_type}/"),
            format!("/{singular}/{{"),
            format!("/{{owner}}/{{repo}}/{resource_type}"),
            format!("/{{org}}/{{project}}/{resource_type}"),
        ];

        let operation_prefixes = vec![
            format!("{resource_type}/"),
            format!("{resource_type}-"),
            format!("{singular}/"),
            format!("{singular}-"),
        ];

        Some(Self {
            singular: singular.clone(),
            required_tags: secondary_resources(&resource_type).iter().map(|s| s.to_string()).collect(),
            path_patterns,
            operation_prefixes,
            resource_type,
        })
    }

    pub fn matches_prefix(&self, operation_id: &str) -> bool {
        self.operation_prefixes.iter().any(|p| operation_id.starts_with(p.as_str()))
    }

    fn composite_score(&self, op: &ApiOperation) -> i64 {
        let mut score = 0i64;

        if self.matches_prefix(&op.id) {
            score += 10;
        }
        if op.id.contains(&self.resource_type) || op.id.contains(&self.singular) {
            score += 5;
        }
        if self.path_patterns.iter().any(|p| op.path.contains(p.as_str())) {
            score += 8;
        }
        if op.path.contains(&format!("/{}", self.resource_type)) || op.path.contains(&format!("/{}", self.singular)) {
            score += 5;
        }
        let matching_tags = op.tags.iter().filter(|t| self.required_tags.contains(t)).count();
        score += 7 * matching_tags as i64;
        if secondary_resources(&self.resource_type).iter().any(|r| op.id.contains(r) || op.path.contains(r)) {
            score += 3;
        }

        score
    }

    /// `filter_operations_by_scope`: keeps operations whose composite score
    /// is ≥5, honouring explicit includes/excludes first.
    pub fn filter_operations<'a>(
        &self,
        operations: &'a [ApiOperation],
        includes: &[String],
        excludes: &[String],
    ) -> HashMap<String, &'a ApiOperation> {
        let mut out = HashMap::new();
        for op in operations {
            if excludes.contains(&op.id) {
                continue;
            }
            if includes.contains(&op.id) || self.composite_score(op) >= 5 {
                out.insert(op.id.clone(), op);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: &str, path: &str) -> ApiOperation {
        ApiOperation {
            id: id.to_string(),
            path: path.to_string(),
            method: "GET".to_string(),
            tags: vec![],
            required_params: vec![],
            optional_params: vec![],
            returns_list: false,
        }
    }

    #[test]
    fn derives_plural_and_singular() {
        let scope = ResourceScope::from_tool_name("github_issues").unwrap();
        assert_eq!(scope.resource_type, "issues");
        assert_eq!(scope.singular, "issue");
    }

    #[test]
    fn filter_includes_prefix_matches() {
        let scope = ResourceScope::from_tool_name("github_issues").unwrap();
        let ops = vec![
            op("issues/list-for-repo", "/repos/{owner}/{repo}/issues"),
            op("pulls/list", "/repos/{owner}/{repo}/pulls"),
        ];
        let filtered = scope.filter_operations(&ops, &[], &[]);
        assert!(filtered.contains_key("issues/list-for-repo"));
        assert!(!filtered.contains_key("pulls/list"));
    }

    #[test]
    fn explicit_include_overrides_low_score() {
        let scope = ResourceScope::from_tool_name("github_issues").unwrap();
        let ops = vec![op("unrelated-op", "/unrelated")];
        let filtered = scope.filter_operations(&ops, &["unrelated-op".to_string()], &[]);
        assert!(filtered.contains_key("unrelated-op"));
    }
}
