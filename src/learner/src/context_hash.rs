//! `op_cache:{tool_id}[:{scope}]:{action}:{context_hash}` key construction.
//! `context_hash` is an 8-byte prefix of SHA-256 over the sorted
//! non-`__`-prefixed parameter names plus `key=value` for a fixed list of
//! identifying params, deliberately excluding everything else to maximise
//! hit rate across otherwise-distinct calls.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

const IDENTIFYING_PARAMS: &[&str] = &["owner", "repo", "org", "user", "id", "name"];

/// `context` is a flat string→string view over the request's parameter bag
/// (non-string values are excluded per spec, same as identifying params).
pub fn context_hash(context: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    for name in context.keys().filter(|k| !k.starts_with("__")) {
        hasher.update(name.as_bytes());
        hasher.update(b",");
    }
    for key in IDENTIFYING_PARAMS {
        if let Some(value) = context.get(*key) {
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b";");
        }
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

pub fn cache_key(tool_id: &str, scope: Option<&str>, action: &str, hash: &str) -> String {
    match scope {
        Some(scope) => format!("op_cache:{tool_id}:{scope}:{action}:{hash}"),
        None => format!("op_cache:{tool_id}:{action}:{hash}"),
    }
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_dunder_prefixed_params_from_name_list() {
        let mut a = BTreeMap::new();
        a.insert("owner".to_string(), "octocat".to_string());
        a.insert("__internal".to_string(), "x".to_string());

        let mut b = a.clone();
        b.remove("__internal");

        assert_eq!(context_hash(&a), context_hash(&b));
    }

    #[test]
    fn identifying_param_value_changes_hash() {
        let mut a = BTreeMap::new();
        a.insert("owner".to_string(), "octocat".to_string());
        let mut b = BTreeMap::new();
        b.insert("owner".to_string(), "torvalds".to_string());
        assert_ne!(context_hash(&a), context_hash(&b));
    }

    #[test]
    fn hash_is_eight_bytes_hex_encoded() {
        let ctx = BTreeMap::new();
        assert_eq!(context_hash(&ctx).len(), 16);
    }
}
