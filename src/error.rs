use std::path::PathBuf;

use thiserror::Error;

/// Failures while choosing the seed workspaces for a run.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no workspace named or located at `{0}`")]
    UnknownWorkspace(String),
    #[error("the project snapshot declares no workspaces")]
    NoWorkspaces,
}

/// Invalid configuration detected before any traversal or audit runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the license allow-list is empty; pass --allow or set `audit.allow` in {0}")]
    EmptyAllowList(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
