use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CollectConfig;
use crate::graph::collector::{CollectOptions, Collection};

#[derive(Parser, Debug)]
#[command(
    name = "workspace-licenses",
    about = "List and audit the licenses of dependencies reachable from project workspaces",
    version
)]
pub struct Cli {
    /// Resolved project snapshot (JSON)
    #[arg(long, global = true, default_value = "workspace-snapshot.json", value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Config file [default: ./.workspace-licenses/config.toml, fallback ~/.config/workspace-licenses/config.toml]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every reachable dependency with its license
    List(TraversalArgs),
    /// Report dependencies whose license is not allowed; exits 1 on violations
    Audit {
        #[command(flatten)]
        traversal: TraversalArgs,

        /// Allowed license (repeatable or comma separated); replaces the configured list
        #[arg(long, value_name = "LICENSE")]
        allow: Vec<String>,
    },
}

impl Command {
    pub fn traversal(&self) -> &TraversalArgs {
        match self {
            Command::List(args) => args,
            Command::Audit { traversal, .. } => traversal,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TraversalArgs {
    /// Workspace name or path to start from (repeatable) [default: the root workspace]
    #[arg(short, long = "workspace", value_name = "WORKSPACE", conflicts_with = "all")]
    pub workspaces: Vec<String>,

    /// Start from every workspace in the project
    #[arg(long)]
    pub all: bool,

    /// Include dev dependencies
    #[arg(long)]
    pub dev: bool,

    /// Follow dependencies on other workspaces
    #[arg(long)]
    pub recursive_workspaces: bool,

    /// Follow transitive npm dependencies
    #[arg(long)]
    pub recursive_npm: bool,

    /// Fetch license data from the npm registry instead of the snapshot
    #[arg(long)]
    pub online: bool,

    /// Maximum concurrent metadata lookups [default: from config, 8]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

impl TraversalArgs {
    /// Merge flags over the configured defaults; flags only ever enable.
    pub fn options(&self, config: &CollectConfig) -> CollectOptions {
        let base = config.options();
        CollectOptions {
            include_dev: base.include_dev || self.dev,
            recursive_workspaces: base.recursive_workspaces || self.recursive_workspaces,
            recursive_npm: base.recursive_npm || self.recursive_npm,
        }
    }

    pub fn concurrency(&self, config: &CollectConfig) -> usize {
        self.concurrency.unwrap_or(config.concurrency)
    }

    /// Whether to warn that `--recursive-workspaces` reached nothing beyond
    /// the `seeds` selected workspaces. Never with `--all`, where every
    /// workspace is already a seed.
    pub fn warn_unreached_workspaces(
        &self,
        options: CollectOptions,
        collection: &Collection,
        seeds: usize,
    ) -> bool {
        options.recursive_workspaces
            && !self.all
            && !self.quiet
            && !self.json
            && collection.visited_workspaces.len() <= seeds
    }
}
