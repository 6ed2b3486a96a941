//! A pre-parsed OpenAPI document, reduced to exactly what resolution needs.
//! Parsing the document itself is out of scope (§1); this module only
//! indexes operations that are handed to it already structured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const VERBS: &[&str] = &[
    "get", "list", "create", "update", "delete", "patch", "post", "put", "remove", "add", "set",
    "fetch", "search", "find", "query", "read", "write",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOperation {
    pub id: String,
    pub path: String,
    pub method: String,
    pub tags: Vec<String>,
    pub required_params: Vec<String>,
    pub optional_params: Vec<String>,
    pub returns_list: bool,
}

impl ApiOperation {
    /// A path pattern is "simple" at depth ≤2 with no nested `{param}/{param}`.
    pub fn is_sub_resource(&self) -> bool {
        let placeholder_count = self.path.matches('{').count();
        placeholder_count >= 2
    }

    pub fn path_depth(&self) -> usize {
        self.path.split('/').filter(|s| !s.is_empty()).count()
    }

    pub fn path_placeholders(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter(|s| s.starts_with('{') && s.ends_with('}'))
            .map(|s| &s[1..s.len() - 1])
            .collect()
    }
}

/// Every lookup key an operation can be found under, plus its primary verb.
pub struct IndexedOperation {
    pub operation: ApiOperation,
    pub primary_verb: Option<String>,
}

pub struct OpenApiIndex {
    pub operations: HashMap<String, IndexedOperation>,
    key_map: HashMap<String, String>,
    verb_map: HashMap<String, Vec<String>>,
}

impl OpenApiIndex {
    pub fn build(operations: Vec<ApiOperation>) -> Self {
        let mut key_map = HashMap::new();
        let mut verb_map: HashMap<String, Vec<String>> = HashMap::new();
        let mut indexed = HashMap::new();

        for op in operations {
            let primary_verb = extract_verb(&op.id);
            for key in lookup_keys(&op) {
                key_map.entry(key).or_insert_with(|| op.id.clone());
            }
            if let Some(verb) = &primary_verb {
                verb_map.entry(verb.clone()).or_default().push(op.id.clone());
            }
            let id = op.id.clone();
            indexed.insert(id, IndexedOperation { operation: op, primary_verb });
        }

        Self {
            operations: indexed,
            key_map,
            verb_map,
        }
    }

    pub fn lookup_key(&self, key: &str) -> Option<&str> {
        self.key_map.get(key).map(String::as_str)
    }

    pub fn operations_for_verb(&self, verb: &str) -> &[String] {
        self.verb_map.get(verb).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, operation_id: &str) -> Option<&ApiOperation> {
        self.operations.get(operation_id).map(|i| &i.operation)
    }

    pub fn all_ids(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }
}

fn last_path_segment(path: &str) -> String {
    path.rsplit('/').find(|s| !s.is_empty() && !s.starts_with('{')).unwrap_or("").to_string()
}

fn lookup_keys(op: &ApiOperation) -> Vec<String> {
    let mut keys = vec![op.id.clone(), op.id.to_lowercase()];

    for (from, to) in [('/', '-'), ('/', '_'), ('-', '/'), ('-', '_'), ('_', '/'), ('_', '-')] {
        keys.push(op.id.replace(from, &to.to_string()));
    }

    keys.push(format!("{}_{}", op.method.to_lowercase(), last_path_segment(&op.path)));

    for tag in &op.tags {
        keys.push(format!("{}_{}", tag.to_lowercase(), op.id.to_lowercase()));
    }

    keys
}

pub fn extract_verb(id: &str) -> Option<String> {
    id.split(['/', '-', '_', '.'])
        .map(str::to_lowercase)
        .find(|token| VERBS.contains(&token.as_str()))
}

pub fn is_common_verb(verb: &str) -> bool {
    VERBS.contains(&verb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: &str, path: &str, method: &str) -> ApiOperation {
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
    fn extracts_primary_verb_from_slash_separated_id() {
        assert_eq!(extract_verb("repos/get"), Some("get".to_string()));
    }

    #[test]
    fn unknown_prefix_yields_no_verb() {
        assert_eq!(extract_verb("octocat/special"), None);
    }

    #[test]
    fn index_resolves_normalized_and_tagged_keys() {
        let index = OpenApiIndex::build(vec![op("repos/get", "/repos/{owner}/{repo}", "GET")]);
        assert_eq!(index.lookup_key("repos/get"), Some("repos/get"));
        assert_eq!(index.lookup_key("repos-get"), Some("repos/get"));
    }

    #[test]
    fn hyphenated_compound_ids_are_preserved_as_a_key() {
        let index = OpenApiIndex::build(vec![op(
            "actions-list-repo-workflows",
            "/repos/{owner}/{repo}/actions/workflows",
            "GET",
        )]);
        assert_eq!(
            index.lookup_key("actions-list-repo-workflows"),
            Some("actions-list-repo-workflows")
        );
    }
}
