//! Fixed regex set over text content. Each rule is named after the PII kind
//! it recognises; `detect` returns every kind with at least one match,
//! `redact` blanks every match in place.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RULES: Vec<(&'static str, Regex)> = vec![
        ("ssn", Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap()),
        (
            "credit_card",
            Regex::new(r"\b\d{4}[ -]?\d{4}[ -]?\d{4}[ -]?\d{4}\b").unwrap()
        ),
        (
            "email",
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
        ),
        (
            "phone",
            Regex::new(r"\b(?:\+1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b").unwrap()
        ),
        (
            "ipv4",
            Regex::new(r"\b(?:(?:25[0-5]|2[0-4]\d|1?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|1?\d?\d)\b")
                .unwrap()
        ),
        ("dob", Regex::new(r"\b(0[1-9]|1[0-2])/(0[1-9]|[12]\d|3[01])/\d{4}\b").unwrap()),
        ("passport", Regex::new(r"\b[A-Z]{1,2}[0-9]{6,9}\b").unwrap()),
        (
            "drivers_license",
            Regex::new(r"\b[A-Z]{1,2}\d{5,8}\b").unwrap()
        ),
    ];
}

#[derive(Debug, Default, Clone)]
pub struct PiiDetector;

impl PiiDetector {
    pub fn new() -> Self {
        Self
    }

    /// Returns the distinct PII type names found in `text`.
    pub fn detect(&self, text: &str) -> Vec<String> {
        RULES
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Replaces every match of every rule with `[REDACTED]`.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (_, re) in RULES.iter() {
            out = re.replace_all(&out, "[REDACTED]").into_owned();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_ssn_and_email() {
        let detector = PiiDetector::new();
        let found = detector.detect("contact jane@example.com, ssn 123-45-6789");
        assert!(found.contains(&"ssn".to_string()));
        assert!(found.contains(&"email".to_string()));
    }

    #[test]
    fn redact_removes_matches() {
        let detector = PiiDetector::new();
        let redacted = detector.redact("email me at jane@example.com");
        assert!(!redacted.contains("jane@example.com"));
        assert!(redacted.contains("[REDACTED]"));
    }

    #[test]
    fn clean_text_has_no_findings() {
        let detector = PiiDetector::new();
        assert!(detector.detect("the quick brown fox jumps over the lazy dog").is_empty());
    }
}
