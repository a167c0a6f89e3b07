use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier of one resolved package, e.g. `lodash@npm:4.17.21`.
///
/// Identifiers are opaque: two locators are equal iff their identifiers are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dependency request as declared in a manifest: `name@range`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Descriptor {
    pub name: String,
    pub range: String,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: range.into(),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.range)
    }
}

impl FromStr for Descriptor {
    type Err = String;

    /// Parse `name@range`. Scoped names (`@scope/pkg@range`) keep their leading `@`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Skip the first byte so a scope marker is never taken as the separator
        let split = s
            .get(1..)
            .and_then(|rest| rest.find('@'))
            .map(|i| i + 1);

        match split {
            Some(i) if i + 1 < s.len() => Ok(Descriptor::new(&s[..i], &s[i + 1..])),
            _ => Err(format!("invalid descriptor `{}`: expected `name@range`", s)),
        }
    }
}

impl TryFrom<String> for Descriptor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Descriptor> for String {
    fn from(d: Descriptor) -> Self {
        d.to_string()
    }
}

/// One reported dependency and its declared license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseEntry {
    pub name: String,
    pub version: String,
    /// Free-form license string; may be a single id or an `AND`/`OR` expression.
    pub license_type: String,
    /// Canonical repository (or homepage) URL, empty when neither is declared.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Allowed,
    Violation,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::Allowed => write!(f, "allowed"),
            AuditStatus::Violation => write!(f, "violation"),
        }
    }
}

/// A [`LicenseEntry`] classified against an allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    #[serde(flatten)]
    pub entry: LicenseEntry,
    pub status: AuditStatus,
    /// The allow-list rule, as written by the user, that satisfied the license.
    pub matched_allow_rule: Option<String>,
    pub detected_license_tokens: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let d: Descriptor = "lodash@npm:^4.17.0".parse().unwrap();
        assert_eq!(d.name, "lodash");
        assert_eq!(d.range, "npm:^4.17.0");
    }

    #[test]
    fn test_parse_scoped_descriptor() {
        let d: Descriptor = "@types/node@npm:^20.0.0".parse().unwrap();
        assert_eq!(d.name, "@types/node");
        assert_eq!(d.range, "npm:^20.0.0");
        assert_eq!(d.to_string(), "@types/node@npm:^20.0.0");
    }

    #[test]
    fn test_parse_invalid_descriptor() {
        assert!("lodash".parse::<Descriptor>().is_err());
        assert!("@types/node".parse::<Descriptor>().is_err());
        assert!("lodash@".parse::<Descriptor>().is_err());
    }

    #[test]
    fn test_audit_entry_json_shape() {
        let entry = AuditEntry {
            entry: LicenseEntry {
                name: "left-pad".to_string(),
                version: "1.3.0".to_string(),
                license_type: "WTFPL".to_string(),
                url: String::new(),
            },
            status: AuditStatus::Violation,
            matched_allow_rule: None,
            detected_license_tokens: vec!["WTFPL".to_string()],
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["licenseType"], "WTFPL");
        assert_eq!(json["status"], "violation");
        assert!(json["matchedAllowRule"].is_null());
        assert_eq!(json["detectedLicenseTokens"][0], "WTFPL");
    }
}
