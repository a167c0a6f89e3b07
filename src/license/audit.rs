use std::collections::HashMap;

use super::expression::{fallback_tokens, LicenseExpr};
use crate::models::{AuditEntry, AuditStatus, LicenseEntry};

/// Normalize a license token or allow rule for comparison: trimmed, inner
/// whitespace collapsed to single spaces, uppercased.
pub fn normalize_license(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// A de-duplicated set of allowed licenses.
///
/// Rules compare case- and whitespace-insensitively; each keeps the spelling
/// of its first occurrence for display.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    rules: Vec<String>,
    index: HashMap<String, usize>,
}

impl AllowList {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = AllowList::default();
        for rule in rules {
            let display = rule.as_ref().trim();
            let key = normalize_license(display);
            if key.is_empty() || list.index.contains_key(&key) {
                continue;
            }
            list.index.insert(key, list.rules.len());
            list.rules.push(display.to_string());
        }
        list
    }

    /// Parse a comma-separated list, e.g. the value of `--allow MIT,ISC`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// The rule allowing `license`, if any.
    pub fn matching_rule(&self, license: &str) -> Option<&str> {
        self.index
            .get(&normalize_license(license))
            .map(|&i| self.rules[i].as_str())
    }
}

/// Classify one license string against the allow-list.
fn audit_license(license: &str, allow: &AllowList) -> (AuditStatus, Option<String>, Vec<String>) {
    if license.trim().is_empty() {
        return (AuditStatus::Violation, None, Vec::new());
    }

    match LicenseExpr::parse(license) {
        Ok(expr) => {
            let matched = expr.evaluate(&|id: &str| allow.matching_rule(id));
            let status = if matched.is_some() {
                AuditStatus::Allowed
            } else {
                AuditStatus::Violation
            };
            (status, matched.map(str::to_string), expr.licenses())
        }
        Err(_) => (AuditStatus::Violation, None, fallback_tokens(license)),
    }
}

/// Audit every entry against `allow`, preserving input order.
pub fn audit_license_entries(entries: &[LicenseEntry], allow: &AllowList) -> Vec<AuditEntry> {
    entries
        .iter()
        .map(|entry| {
            let (status, matched_allow_rule, detected_license_tokens) =
                audit_license(&entry.license_type, allow);
            AuditEntry {
                entry: entry.clone(),
                status,
                matched_allow_rule,
                detected_license_tokens,
            }
        })
        .collect()
}

/// Entries whose license is not allowed.
pub fn violations(entries: &[AuditEntry]) -> Vec<&AuditEntry> {
    entries
        .iter()
        .filter(|e| e.status == AuditStatus::Violation)
        .collect()
}

pub fn has_violations(entries: &[AuditEntry]) -> bool {
    entries.iter().any(|e| e.status == AuditStatus::Violation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(license: &str) -> LicenseEntry {
        LicenseEntry {
            name: "pkg".to_string(),
            version: "1.0.0".to_string(),
            license_type: license.to_string(),
            url: String::new(),
        }
    }

    fn audit_one(license: &str, allow: &[&str]) -> AuditEntry {
        let allow = AllowList::new(allow);
        audit_license_entries(&[entry(license)], &allow).remove(0)
    }

    #[test]
    fn test_or_allows_either_side() {
        let audited = audit_one("Apache-2.0 OR MIT", &["MIT"]);
        assert_eq!(audited.status, AuditStatus::Allowed);
        assert_eq!(audited.matched_allow_rule.as_deref(), Some("MIT"));
        assert_eq!(audited.detected_license_tokens, vec!["Apache-2.0", "MIT"]);
    }

    #[test]
    fn test_not_in_allow_list() {
        let audited = audit_one("GPL-3.0", &["MIT", "Apache-2.0"]);
        assert_eq!(audited.status, AuditStatus::Violation);
        assert_eq!(audited.matched_allow_rule, None);
        assert_eq!(audited.detected_license_tokens, vec!["GPL-3.0"]);
    }

    #[test]
    fn test_case_insensitive_match_reports_rule_spelling() {
        let audited = audit_one("MIT", &["mit"]);
        assert_eq!(audited.status, AuditStatus::Allowed);
        assert_eq!(audited.matched_allow_rule.as_deref(), Some("mit"));
    }

    #[test]
    fn test_and_requires_both() {
        assert_eq!(
            audit_one("MIT AND GPL-3.0", &["MIT"]).status,
            AuditStatus::Violation
        );

        let audited = audit_one("MIT AND ISC", &["ISC", "MIT"]);
        assert_eq!(audited.status, AuditStatus::Allowed);
        assert_eq!(audited.matched_allow_rule.as_deref(), Some("MIT"));
    }

    #[test]
    fn test_nested_expression() {
        let audited = audit_one("(MIT OR Apache-2.0) AND CC0-1.0", &["Apache-2.0", "CC0-1.0"]);
        assert_eq!(audited.status, AuditStatus::Allowed);
        assert_eq!(audited.matched_allow_rule.as_deref(), Some("Apache-2.0"));
        assert_eq!(
            audited.detected_license_tokens,
            vec!["MIT", "Apache-2.0", "CC0-1.0"]
        );
    }

    #[test]
    fn test_whitespace_in_tokens_and_rules() {
        let audited = audit_one("CC0   1.0", &["  cc0 1.0 "]);
        assert_eq!(audited.status, AuditStatus::Allowed);
        assert_eq!(audited.matched_allow_rule.as_deref(), Some("cc0 1.0"));
        assert_eq!(audited.detected_license_tokens, vec!["CC0 1.0"]);
    }

    #[test]
    fn test_malformed_falls_back() {
        let audited = audit_one("(MIT", &["MIT"]);
        assert_eq!(audited.status, AuditStatus::Violation);
        assert_eq!(audited.matched_allow_rule, None);
        assert_eq!(audited.detected_license_tokens, vec!["MIT"]);
    }

    #[test]
    fn test_empty_license() {
        let audited = audit_one("   ", &["MIT"]);
        assert_eq!(audited.status, AuditStatus::Violation);
        assert!(audited.detected_license_tokens.is_empty());
    }

    #[test]
    fn test_allow_list_dedup_keeps_first() {
        let allow = AllowList::new(["MIT", " mit ", "Apache-2.0", "", "APACHE-2.0"]);
        assert_eq!(allow.rules(), ["MIT", "Apache-2.0"]);
        assert_eq!(allow.len(), 2);
        assert_eq!(allow.matching_rule("apache-2.0"), Some("Apache-2.0"));

        let parsed = AllowList::parse("MIT, ISC,,mit");
        assert_eq!(parsed.rules(), ["MIT", "ISC"]);
    }

    #[test]
    fn test_order_preserved_and_queries() {
        let allow = AllowList::new(["MIT"]);
        let audited = audit_license_entries(
            &[entry("GPL-3.0"), entry("MIT"), entry("")],
            &allow,
        );
        assert_eq!(audited[0].entry.license_type, "GPL-3.0");
        assert_eq!(audited[1].status, AuditStatus::Allowed);
        assert_eq!(violations(&audited).len(), 2);
        assert!(has_violations(&audited));
        assert!(!has_violations(&audited[1..2]));
    }

    #[test]
    fn test_matched_rule_iff_allowed() {
        let allow = AllowList::new(["MIT", "ISC"]);
        let licenses = ["MIT", "GPL-2.0", "MIT AND ISC", "(ISC", "", "BSD OR ISC"];
        let entries: Vec<_> = licenses.iter().map(|l| entry(l)).collect();
        for audited in audit_license_entries(&entries, &allow) {
            assert_eq!(
                audited.matched_allow_rule.is_some(),
                audited.status == AuditStatus::Allowed
            );
        }
    }
}
