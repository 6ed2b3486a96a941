//! Keyword- and regex-driven rules, each tagged with the classification it
//! implies. The result is the maximum classification across every matching
//! rule — `DataClassification`'s derive order gives us that for free.

use lazy_static::lazy_static;
use regex::Regex;
use rtc_types::DataClassification;

struct Rule {
    classification: DataClassification,
    keywords: &'static [&'static str],
    pattern: Option<Regex>,
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        Rule {
            classification: DataClassification::Restricted,
            keywords: &["ssn", "social security", "passport number"],
            pattern: Some(Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap()),
        },
        Rule {
            classification: DataClassification::Confidential,
            keywords: &["confidential", "proprietary", "do not distribute", "salary"],
            pattern: None,
        },
        Rule {
            classification: DataClassification::Internal,
            keywords: &["internal use only", "internal-only", "employee id"],
            pattern: None,
        },
    ];
}

#[derive(Debug, Default, Clone)]
pub struct DataClassifier;

impl DataClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> DataClassification {
        let lower = text.to_lowercase();
        let mut best = DataClassification::Public;
        for rule in RULES.iter() {
            let keyword_hit = rule.keywords.iter().any(|k| lower.contains(k));
            let pattern_hit = rule.pattern.as_ref().is_some_and(|re| re.is_match(text));
            if keyword_hit || pattern_hit {
                best = best.max(rule.classification);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_public() {
        assert_eq!(
            DataClassifier::new().classify("hello world"),
            DataClassification::Public
        );
    }

    #[test]
    fn ssn_pattern_is_restricted() {
        assert_eq!(
            DataClassifier::new().classify("ssn: 123-45-6789"),
            DataClassification::Restricted
        );
    }

    #[test]
    fn confidential_keyword_outranks_internal() {
        let classifier = DataClassifier::new();
        let result = classifier.classify("internal use only, also confidential salary data");
        assert_eq!(result, DataClassification::Confidential);
    }
}
