use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::PathBuf;

use super::{ProjectGraph, Workspace};
use crate::models::{Descriptor, Locator};

/// Traversal policy for [`collect_external_locators`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectOptions {
    /// Follow dev dependencies of visited workspaces.
    pub include_dev: bool,
    /// Follow workspace → workspace edges.
    pub recursive_workspaces: bool,
    /// Follow the dependencies of external packages.
    pub recursive_npm: bool,
}

/// Result of a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Every external package reached.
    pub locators: BTreeSet<Locator>,
    /// Workspace paths in the order they were visited, seeds included.
    pub visited_workspaces: Vec<PathBuf>,
}

/// A pending traversal step. Workspaces are addressed by path, external
/// packages by locator; the two namespaces never share a visited set.
#[derive(Debug)]
enum Frontier {
    Workspace(PathBuf),
    Locator(Locator),
}

/// Breadth-first reachability over the project graph.
///
/// First-depth external dependencies of every visited workspace are always
/// collected. Deeper packages are only followed with `recursive_npm`, and
/// workspace-to-workspace edges only with `recursive_workspaces`.
pub struct Collector<'g, G: ProjectGraph> {
    graph: &'g G,
    options: CollectOptions,
    queue: VecDeque<Frontier>,
    visited_paths: HashSet<PathBuf>,
    visited_locators: HashSet<Locator>,
    collection: Collection,
}

impl<'g, G: ProjectGraph> Collector<'g, G> {
    pub fn new(graph: &'g G, options: CollectOptions) -> Self {
        Self {
            graph,
            options,
            queue: VecDeque::new(),
            visited_paths: HashSet::new(),
            visited_locators: HashSet::new(),
            collection: Collection::default(),
        }
    }

    pub fn run<'w>(mut self, seeds: impl IntoIterator<Item = &'w Workspace>) -> Collection {
        for ws in seeds {
            self.queue.push_back(Frontier::Workspace(ws.path.clone()));
        }

        while let Some(item) = self.queue.pop_front() {
            match item {
                Frontier::Workspace(path) => self.visit_workspace(path),
                Frontier::Locator(locator) => self.visit_locator(locator),
            }
        }

        self.collection
    }

    fn visit_workspace(&mut self, path: PathBuf) {
        if !self.visited_paths.insert(path.clone()) {
            return;
        }
        let graph = self.graph;
        let Some(ws) = graph.workspace_by_path(&path) else {
            return;
        };
        self.collection.visited_workspaces.push(path);

        let dev: &[Descriptor] = if self.options.include_dev {
            &ws.dev_dependencies
        } else {
            &[]
        };

        for descriptor in ws.dependencies.iter().chain(dev) {
            let Some(locator) = self.resolve(descriptor) else {
                continue;
            };

            if let Some(target) = graph.workspace_by_locator(locator) {
                if self.options.recursive_workspaces {
                    self.queue.push_back(Frontier::Workspace(target.path.clone()));
                }
                continue;
            }

            self.collection.locators.insert(locator.clone());
            if self.options.recursive_npm && !self.visited_locators.contains(locator) {
                self.queue.push_back(Frontier::Locator(locator.clone()));
            }
        }
    }

    fn visit_locator(&mut self, locator: Locator) {
        if !self.visited_locators.insert(locator.clone()) {
            return;
        }
        // Locator items are only enqueued under `recursive_npm`; a stray one
        // must not pull in transitive packages.
        if !self.options.recursive_npm {
            return;
        }
        let graph = self.graph;
        let Some(package) = graph.package(&locator) else {
            return;
        };

        for descriptor in &package.dependencies {
            let Some(dep) = self.resolve(descriptor) else {
                continue;
            };

            if let Some(target) = graph.workspace_by_locator(dep) {
                if self.options.recursive_workspaces {
                    self.queue.push_back(Frontier::Workspace(target.path.clone()));
                }
                continue;
            }

            self.collection.locators.insert(dep.clone());
            if !self.visited_locators.contains(dep) {
                self.queue.push_back(Frontier::Locator(dep.clone()));
            }
        }
    }

    /// Resolve a descriptor to a locator with a package record. Anything else
    /// (unresolved, pruned, optional and absent) is an edge to skip.
    fn resolve(&self, descriptor: &Descriptor) -> Option<&'g Locator> {
        let graph = self.graph;
        let locator = graph.resolve(descriptor)?;
        graph.package(locator)?;
        Some(locator)
    }
}

/// Collect every external package reachable from `seeds` under `options`.
pub fn collect_external_locators<'w, G: ProjectGraph>(
    graph: &G,
    seeds: impl IntoIterator<Item = &'w Workspace>,
    options: CollectOptions,
) -> BTreeSet<Locator> {
    Collector::new(graph, options).run(seeds).locators
}
