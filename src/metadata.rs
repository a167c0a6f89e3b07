//! Per-package license metadata lookup.
//!
//! - [`SnapshotMetadata`] — offline; reads the manifest fields recorded in the
//!   project snapshot.
//! - [`RegistryMetadata`] — fetches the published manifest from the npm
//!   registry (`--online`).
//!
//! A failed lookup is an error for the whole run, never a silently empty
//! license.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::graph::Package;
use crate::models::Locator;

const NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// License-related manifest fields of one package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageMetadata {
    pub license_type: Option<String>,
    pub raw_repository: Option<Value>,
    pub raw_homepage: Option<Value>,
}

impl PackageMetadata {
    /// Extract the metadata fields from a package manifest (`package.json`).
    pub fn from_manifest(manifest: &Value) -> Self {
        Self {
            license_type: manifest.get("license").and_then(license_from_manifest).or_else(|| {
                // Pre-SPDX manifests used a `licenses` array
                manifest.get("licenses").and_then(license_from_manifest)
            }),
            raw_repository: manifest.get("repository").cloned(),
            raw_homepage: manifest.get("homepage").cloned(),
        }
    }
}

/// Read a manifest `license` value: a string, a legacy `{ "type": ... }`
/// object, or an array of either (joined as alternatives).
pub fn license_from_manifest(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Object(map) => map.get("type").and_then(license_from_manifest),
        Value::Array(items) => {
            let ids: Vec<String> = items.iter().filter_map(license_from_manifest).collect();
            match ids.len() {
                0 => None,
                1 => ids.into_iter().next(),
                _ => Some(format!("({})", ids.join(" OR "))),
            }
        }
        _ => None,
    }
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, locator: &Locator, package: &Package) -> Result<PackageMetadata>;
}

/// Metadata recorded in the snapshot's package records.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotMetadata;

#[async_trait]
impl MetadataSource for SnapshotMetadata {
    async fn fetch(&self, _locator: &Locator, package: &Package) -> Result<PackageMetadata> {
        Ok(PackageMetadata {
            license_type: package.license.as_ref().and_then(license_from_manifest),
            raw_repository: package.repository.clone(),
            raw_homepage: package.homepage.clone(),
        })
    }
}

/// Metadata fetched from the npm registry.
pub struct RegistryMetadata {
    client: Client,
    registry: String,
}

impl RegistryMetadata {
    pub fn new() -> Result<Self> {
        Self::with_registry(NPM_REGISTRY)
    }

    pub fn with_registry(registry: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("workspace-licenses/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            registry: registry.trim_end_matches('/').to_string(),
        })
    }

    fn manifest_url(&self, name: &str, version: &str) -> String {
        // Scoped packages need URL encoding: @scope/pkg → @scope%2Fpkg
        let encoded_name = name.replace('/', "%2F");
        format!("{}/{}/{}", self.registry, encoded_name, version)
    }
}

#[async_trait]
impl MetadataSource for RegistryMetadata {
    async fn fetch(&self, locator: &Locator, package: &Package) -> Result<PackageMetadata> {
        let url = self.manifest_url(&package.name, &package.version);

        let manifest: Value = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to fetch {} for {}", url, locator))?
            .json()
            .await
            .with_context(|| format!("invalid registry manifest for {}", locator))?;

        Ok(PackageMetadata::from_manifest(&manifest))
    }
}
