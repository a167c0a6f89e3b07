//! The resolved dependency graph of a project and its traversal.
//!
//! - [`ProjectGraph`] — read-only queries the traversal needs (resolution
//!   table, workspace membership, package store).
//! - [`snapshot`] — a JSON-backed implementation loaded per invocation.
//! - [`collector`] — the reachability traversal itself.

pub mod collector;
pub mod snapshot;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Descriptor, Locator};

/// A local, in-project package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub name: String,
    /// Root path relative to the project; the identity used for deduplication.
    pub path: PathBuf,
    pub locator: Locator,
    #[serde(default)]
    pub dependencies: Vec<Descriptor>,
    #[serde(default)]
    pub dev_dependencies: Vec<Descriptor>,
}

/// A package record from the package store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<Descriptor>,
    /// Raw manifest fields, kept verbatim for offline metadata lookup.
    #[serde(default)]
    pub license: Option<Value>,
    #[serde(default)]
    pub repository: Option<Value>,
    #[serde(default)]
    pub homepage: Option<Value>,
}

/// Read-only view over one resolution snapshot.
pub trait ProjectGraph {
    /// Resolution table lookup.
    fn resolve(&self, descriptor: &Descriptor) -> Option<&Locator>;

    fn workspace_by_locator(&self, locator: &Locator) -> Option<&Workspace>;

    fn workspace_by_path(&self, path: &Path) -> Option<&Workspace>;

    /// Package store lookup, for workspaces and external packages alike.
    fn package(&self, locator: &Locator) -> Option<&Package>;
}
