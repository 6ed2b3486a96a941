//! Semantic scorer (§4.4): an integer score in roughly `[0, 400]` summing
//! bounded per-signal contributions. The resource-scope boost is applied
//! outside this module, by the resolver.

use std::collections::HashMap;

use crate::spec::{is_common_verb, ApiOperation};

const LIST_VERBS: &[&str] = &["list", "search", "find"];
const SINGLE_VERBS: &[&str] = &["get", "read", "fetch"];

/// Aliases a caller's parameter name may use for a common required param.
fn aliases(name: &str) -> Vec<&'static str> {
    match name {
        "owner" => vec!["owner", "username", "org"],
        "repo" => vec!["repo", "repository", "repo_name"],
        "id" => vec!["id", "identifier"],
        _ => vec![],
    }
}

pub fn score(
    op: &ApiOperation,
    action: &str,
    primary_verb: Option<&str>,
    context: &HashMap<String, String>,
) -> i64 {
    let mut total = 0i64;
    total += action_verb_match(op, primary_verb);
    total += crud_alignment(op, action);
    total += complexity(op, primary_verb);
    total += required_param_satisfaction(op, context);
    total += path_pattern(op, context);
    total += response_shape(op, action);
    total += tags(op, context);
    total
}

fn action_verb_match(op: &ApiOperation, primary_verb: Option<&str>) -> i64 {
    let verb = match primary_verb {
        Some(v) => v,
        None => return 0,
    };
    let op_id_lower = op.id.to_lowercase();
    if op_id_lower.split(['/', '-', '_', '.']).any(|tok| tok == verb) {
        100
    } else if op_id_lower.contains(verb) {
        50
    } else {
        0
    }
}

fn crud_alignment(op: &ApiOperation, action: &str) -> i64 {
    let action = action.to_lowercase();
    let method = op.method.to_uppercase();
    let aligned = match (method.as_str(), action.as_str()) {
        ("GET", a) if a == "list" => true,
        ("GET", a) if LIST_VERBS.contains(&a) => true,
        ("GET", a) if SINGLE_VERBS.contains(&a) => true,
        ("POST", "create") | ("POST", "add") | ("POST", "set") => true,
        ("PUT", "update") | ("PATCH", "update") | ("PATCH", "patch") => true,
        ("DELETE", "delete") | ("DELETE", "remove") => true,
        _ => false,
    };
    if aligned {
        80
    } else {
        0
    }
}

fn complexity(op: &ApiOperation, primary_verb: Option<&str>) -> i64 {
    let verb = match primary_verb {
        Some(v) if is_common_verb(v) => v,
        _ => return 0,
    };
    let _ = verb;
    let required = op.required_params.len() as i64;
    let optional = op.optional_params.len() as i64;
    let has_complex = i64::from(required + optional > 3);
    let is_sub = i64::from(op.is_sub_resource());
    let penalty = required * 10 + optional * 5 + 20 * has_complex + 15 * is_sub;
    (50 - penalty).max(0)
}

fn required_param_satisfaction(op: &ApiOperation, context: &HashMap<String, String>) -> i64 {
    if op.required_params.is_empty() {
        return 0;
    }
    let total = op.required_params.len();
    let satisfied = op
        .required_params
        .iter()
        .filter(|p| context.contains_key(p.as_str()) || aliases(p).iter().any(|a| context.contains_key(*a)))
        .count();

    let mut score = 20 * satisfied as i64;
    if satisfied == total {
        score += 50;
    } else {
        let missing = total - satisfied;
        score -= (50 * missing / total) as i64;
    }
    score.clamp(-70, 70)
}

fn path_pattern(op: &ApiOperation, context: &HashMap<String, String>) -> i64 {
    let mut score = 0i64;
    if op.path_depth() <= 2 && !op.is_sub_resource() {
        score += 20;
    }
    for placeholder in op.path_placeholders() {
        if context.contains_key(placeholder) {
            score += 15;
        }
    }
    score.min(35)
}

fn response_shape(op: &ApiOperation, action: &str) -> i64 {
    let action = action.to_lowercase();
    let matches = if op.returns_list {
        LIST_VERBS.contains(&action.as_str())
    } else {
        SINGLE_VERBS.contains(&action.as_str())
    };
    if matches {
        30
    } else {
        0
    }
}

fn tags(op: &ApiOperation, context: &HashMap<String, String>) -> i64 {
    let mut score = 0i64;
    if context
        .get("__resource_type")
        .is_some_and(|resource| op.tags.iter().any(|t| t.contains(resource.as_str())))
    {
        score += 40;
    }
    score += 10 * context.keys().filter(|k| op.tags.iter().any(|t| t == *k)).count() as i64;
    score.min(40)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: &str, method: &str, path: &str) -> ApiOperation {
        ApiOperation {
            id: id.to_string(),
            path: path.to_string(),
            method: method.to_string(),
            tags: vec![],
            required_params: vec![],
            optional_params: vec![],
            returns_list: false,
        }
    }

    #[test]
    fn exact_verb_match_scores_full_hundred() {
        let operation = op("repos/get", "GET", "/repos/{owner}/{repo}");
        assert_eq!(action_verb_match(&operation, Some("get")), 100);
    }

    #[test]
    fn partial_verb_match_scores_half() {
        let operation = op("repos-getArchiveLink", "GET", "/repos/{owner}/{repo}/zipball");
        assert_eq!(action_verb_match(&operation, Some("get")), 50);
    }

    #[test]
    fn required_params_all_satisfied_gets_bonus() {
        let mut operation = op("repos/get", "GET", "/repos/{owner}/{repo}");
        operation.required_params = vec!["owner".to_string(), "repo".to_string()];
        let mut context = HashMap::new();
        context.insert("owner".to_string(), "octocat".to_string());
        context.insert("repo".to_string(), "hello".to_string());
        assert_eq!(required_param_satisfaction(&operation, &context), 90);
    }

    #[test]
    fn full_score_is_nonnegative_for_well_matched_operation() {
        let mut operation = op("repos/get", "GET", "/repos/{owner}/{repo}");
        operation.required_params = vec!["owner".to_string(), "repo".to_string()];
        let mut context = HashMap::new();
        context.insert("owner".to_string(), "octocat".to_string());
        context.insert("repo".to_string(), "hello".to_string());
        let total = score(&operation, "get", Some("get"), &context);
        assert!(total > 0);
    }
}
