//! Shared helpers used by more than one stage: the canonical bytes
//! conversion (§4.1 stages 4-5) and the embedding eligibility gate (§4.1.1).

use rtc_types::{ContentAnalysis, ContentType};
use serde_json::Value;

/// `string -> raw bytes; bytes -> identity; map/other -> JSON`. `Value` has
/// no distinct byte-string variant, so "bytes -> identity" collapses into
/// the JSON-encoding branch: a `Value` already holding bytes-as-JSON round
/// trips unchanged through `serde_json::to_vec`.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.clone().into_bytes(),
        other => serde_json::to_vec(other).unwrap_or_default(),
    }
}

/// Embed iff the content is large enough, carries no PII or secrets, and is
/// a content type an embedding model can meaningfully represent.
pub fn embedding_eligible(analysis: &ContentAnalysis) -> bool {
    analysis.size >= 100
        && !analysis.has_pii
        && !analysis.has_secrets
        && matches!(
            analysis.content_type,
            ContentType::Text | ContentType::Code | ContentType::Documentation | ContentType::ApiResponse
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_values_convert_to_raw_utf8_bytes() {
        assert_eq!(canonical_bytes(&Value::String("hello".into())), b"hello".to_vec());
    }

    #[test]
    fn other_values_convert_to_json() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(canonical_bytes(&value), serde_json::to_vec(&value).unwrap());
    }

    #[test]
    fn small_content_is_not_eligible() {
        let analysis = ContentAnalysis { content_type: ContentType::Text, size: 10, has_pii: false, has_secrets: false, language: None };
        assert!(!embedding_eligible(&analysis));
    }

    #[test]
    fn pii_content_is_not_eligible_regardless_of_size() {
        let analysis = ContentAnalysis { content_type: ContentType::Text, size: 10_000, has_pii: true, has_secrets: false, language: None };
        assert!(!embedding_eligible(&analysis));
    }

    #[test]
    fn eligible_content_type_and_size_passes() {
        let analysis = ContentAnalysis { content_type: ContentType::Code, size: 500, has_pii: false, has_secrets: false, language: Some("rust".into()) };
        assert!(embedding_eligible(&analysis));
    }

    #[test]
    fn html_is_never_eligible() {
        let analysis = ContentAnalysis { content_type: ContentType::Html, size: 5000, has_pii: false, has_secrets: false, language: None };
        assert!(!embedding_eligible(&analysis));
    }
}
