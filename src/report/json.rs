use anyhow::Result;

use crate::license::audit::violations;
use crate::models::{AuditEntry, LicenseEntry};

pub fn render_list(entries: &[LicenseEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Audit output lists violations only.
pub fn render_audit(audited: &[AuditEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&violations(audited))?)
}
