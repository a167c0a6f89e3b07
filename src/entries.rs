use std::collections::BTreeSet;

use anyhow::Result;
use indicatif::ProgressBar;

use crate::fanout::map_with_concurrency;
use crate::graph::ProjectGraph;
use crate::metadata::MetadataSource;
use crate::models::{LicenseEntry, Locator};
use crate::repository::canonicalize;

/// Fetch metadata for every collected locator and assemble license entries.
///
/// Locators without a package record are skipped. Entries come back sorted by
/// name, version and url so repeated runs produce identical output.
pub async fn build_license_entries<G: ProjectGraph>(
    graph: &G,
    locators: &BTreeSet<Locator>,
    source: &dyn MetadataSource,
    concurrency: usize,
    progress: Option<&ProgressBar>,
) -> Result<Vec<LicenseEntry>> {
    let locators: Vec<&Locator> = locators.iter().collect();

    let mut entries = map_with_concurrency(&locators, concurrency, |&locator| {
        let package = graph.package(locator).cloned();
        let locator = locator.clone();
        let progress = progress.cloned();
        async move {
            let Some(package) = package else {
                return Ok(None);
            };
            let meta = source.fetch(&locator, &package).await?;
            if let Some(pb) = &progress {
                pb.inc(1);
            }

            let url = meta
                .raw_repository
                .as_ref()
                .and_then(canonicalize)
                .or_else(|| meta.raw_homepage.as_ref().and_then(canonicalize))
                .unwrap_or_default();

            Ok(Some(LicenseEntry {
                name: package.name,
                version: package.version,
                license_type: meta.license_type.unwrap_or_default(),
                url,
            }))
        }
    })
    .await?;

    sort_entries(&mut entries);
    Ok(entries)
}

/// Stable report order: name, then version, then url.
pub fn sort_entries(entries: &mut [LicenseEntry]) {
    entries.sort_by(|a, b| {
        (&a.name, &a.version, &a.url).cmp(&(&b.name, &b.version, &b.url))
    });
}
