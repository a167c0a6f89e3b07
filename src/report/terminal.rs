use std::collections::HashMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::license::audit::{violations, AllowList};
use crate::models::{AuditEntry, AuditStatus, LicenseEntry};

/// Render every license entry as a table, preceded by a per-license summary.
pub fn render_list(entries: &[LicenseEntry], quiet: bool) {
    if quiet {
        println!(
            "Total: {}  Licenses: {}",
            entries.len(),
            count_by_license(entries.iter()).len()
        );
        return;
    }

    print_header();
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Total dependencies : {}", entries.len()));
    for (license, count) in count_by_license(entries.iter()).into_iter().take(8) {
        println!(" │  {:<48} │", format!("  {:<30} {:>6}", truncate(&license, 30), count));
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    if entries.is_empty() {
        return;
    }

    let mut table = new_table(&["Name", "Version", "License", "URL"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(&entry.version),
            license_cell(&entry.license_type),
            Cell::new(&entry.url),
        ]);
    }
    println!("{}", table);
}

/// Render an audit: summary counts, then the violations only.
pub fn render_audit(audited: &[AuditEntry], allow: &AllowList, quiet: bool) {
    let failing = violations(audited);
    let allowed = audited.len() - failing.len();

    if quiet {
        println!(
            "Total: {}  Allowed: {}  Violations: {}",
            audited.len(),
            allowed.to_string().green(),
            failing.len().to_string().red(),
        );
        return;
    }

    print_header();
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "AUDIT".bold());
    println!(" │  {:<48} │", format!("Total dependencies : {}", audited.len()));
    println!(
        " │  {:<48} │",
        format!("{}  Allowed         : {:>4}", "✓".green(), allowed)
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Violations      : {:>4}  {}",
            "✗".red(),
            failing.len(),
            summarize(count_by_license(failing.iter().map(|a| &a.entry)))
        )
    );
    println!(
        " │  {:<48} │",
        truncate(&format!("Allowed licenses   : {}", allow.rules().join(", ")), 48)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if failing.is_empty() {
        println!(" {} All licenses are allowed.", "[PASS]".green().bold());
        return;
    }

    println!(" {} Dependencies violating the allow-list:\n", "[VIOLATION]".red().bold());
    let mut table = new_table(&["Name", "Version", "License", "Detected", "Status"]);
    for audit in failing {
        table.add_row(vec![
            Cell::new(&audit.entry.name),
            Cell::new(&audit.entry.version),
            license_cell(&audit.entry.license_type),
            Cell::new(audit.detected_license_tokens.join(", ")),
            status_cell(audit.status),
        ]);
    }
    println!("{}", table);
}

fn print_header() {
    println!(
        "\n {} v{}\n",
        "workspace-licenses".bold(),
        env!("CARGO_PKG_VERSION")
    );
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn license_cell(license: &str) -> Cell {
    if license.is_empty() {
        Cell::new("unknown").fg(Color::DarkGrey)
    } else {
        Cell::new(license)
    }
}

fn status_cell(status: AuditStatus) -> Cell {
    let (label, color) = match status {
        AuditStatus::Allowed => ("✓ allowed", Color::Green),
        AuditStatus::Violation => ("✗ violation", Color::Red),
    };
    Cell::new(label).fg(color).set_alignment(CellAlignment::Center)
}

/// License → count, most common first, ties by name.
fn count_by_license<'a>(entries: impl Iterator<Item = &'a LicenseEntry>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        let license = if entry.license_type.is_empty() {
            "unknown"
        } else {
            entry.license_type.as_str()
        };
        *counts.entry(license).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(license, count)| (license.to_string(), count))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

fn summarize(pairs: Vec<(String, usize)>) -> String {
    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
