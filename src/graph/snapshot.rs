use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{Package, ProjectGraph, Workspace};
use crate::error::SelectionError;
use crate::models::{Descriptor, Locator};

/// On-disk shape of a snapshot file.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    workspaces: Vec<Workspace>,
    /// Descriptor string → locator.
    #[serde(default)]
    resolutions: HashMap<String, Locator>,
    #[serde(default)]
    packages: HashMap<Locator, Package>,
}

/// An in-memory resolution snapshot of a project.
#[derive(Debug)]
pub struct ProjectSnapshot {
    workspaces: Vec<Workspace>,
    resolutions: HashMap<Descriptor, Locator>,
    packages: HashMap<Locator, Package>,
    by_locator: HashMap<Locator, usize>,
    by_path: HashMap<PathBuf, usize>,
}

impl ProjectSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("invalid snapshot {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(content)?;

        let mut resolutions = HashMap::with_capacity(file.resolutions.len());
        for (raw, locator) in file.resolutions {
            let descriptor: Descriptor = raw.parse().map_err(anyhow::Error::msg)?;
            resolutions.insert(descriptor, locator);
        }

        Ok(Self::new(file.workspaces, resolutions, file.packages))
    }

    /// Build a snapshot from parts. Workspaces without a package record get one
    /// synthesized from their manifest dependencies.
    pub fn new(
        workspaces: Vec<Workspace>,
        resolutions: HashMap<Descriptor, Locator>,
        mut packages: HashMap<Locator, Package>,
    ) -> Self {
        let mut by_locator = HashMap::new();
        let mut by_path = HashMap::new();

        for (i, ws) in workspaces.iter().enumerate() {
            by_locator.insert(ws.locator.clone(), i);
            by_path.insert(normalize_path(&ws.path), i);
            packages
                .entry(ws.locator.clone())
                .or_insert_with(|| Package {
                    name: ws.name.clone(),
                    version: "0.0.0".to_string(),
                    dependencies: ws.dependencies.clone(),
                    ..Package::default()
                });
        }

        Self {
            workspaces,
            resolutions,
            packages,
            by_locator,
            by_path,
        }
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    /// The workspace at the project root, or the first declared one.
    pub fn root_workspace(&self) -> Option<&Workspace> {
        self.workspace_by_path(Path::new(".")).or(self.workspaces.first())
    }

    /// Resolve user-supplied workspace names or paths into seed workspaces,
    /// preserving order and dropping repeats.
    pub fn select_workspaces(&self, selectors: &[String]) -> Result<Vec<&Workspace>, SelectionError> {
        if self.workspaces.is_empty() {
            return Err(SelectionError::NoWorkspaces);
        }

        if selectors.is_empty() {
            return self
                .root_workspace()
                .map(|ws| vec![ws])
                .ok_or(SelectionError::NoWorkspaces);
        }

        let mut selected: Vec<&Workspace> = Vec::new();
        for selector in selectors {
            let ws = self
                .workspaces
                .iter()
                .find(|ws| ws.name == *selector)
                .or_else(|| self.workspace_by_path(Path::new(selector)))
                .ok_or_else(|| SelectionError::UnknownWorkspace(selector.clone()))?;
            if !selected.iter().any(|s| s.path == ws.path) {
                selected.push(ws);
            }
        }
        Ok(selected)
    }
}

impl ProjectGraph for ProjectSnapshot {
    fn resolve(&self, descriptor: &Descriptor) -> Option<&Locator> {
        self.resolutions.get(descriptor)
    }

    fn workspace_by_locator(&self, locator: &Locator) -> Option<&Workspace> {
        self.by_locator.get(locator).map(|&i| &self.workspaces[i])
    }

    fn workspace_by_path(&self, path: &Path) -> Option<&Workspace> {
        self.by_path
            .get(&normalize_path(path))
            .map(|&i| &self.workspaces[i])
    }

    fn package(&self, locator: &Locator) -> Option<&Package> {
        self.packages.get(locator)
    }
}

/// Lexically normalize a workspace path so `./packages/a/` and `packages/a`
/// address the same workspace.
fn normalize_path(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
