use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::graph::collector::CollectOptions;
use crate::license::audit::AllowList;

const CONFIG_DIR: &str = ".workspace-licenses";
const CONFIG_FILE: &str = "config.toml";

/// Root configuration structure, deserialized from `.workspace-licenses/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    /// Where this configuration was read from; `None` for the built-in default.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Default traversal policy; command-line flags can only switch these on.
#[derive(Debug, Deserialize)]
pub struct CollectConfig {
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub recursive_workspaces: bool,
    #[serde(default)]
    pub recursive_npm: bool,
    /// Maximum number of metadata lookups in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    8
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            dev: false,
            recursive_workspaces: false,
            recursive_npm: false,
            concurrency: default_concurrency(),
        }
    }
}

impl CollectConfig {
    pub fn options(&self) -> CollectOptions {
        CollectOptions {
            include_dev: self.dev,
            recursive_workspaces: self.recursive_workspaces,
            recursive_npm: self.recursive_npm,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    /// Licenses considered compliant.
    #[serde(default = "default_allow")]
    pub allow: Vec<String>,
}

/// Built-in allow-list: the common permissive licenses.
fn default_allow() -> Vec<String> {
    ["MIT", "Apache-2.0", "BSD-2-Clause", "BSD-3-Clause", "ISC", "0BSD"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            allow: default_allow(),
        }
    }
}

impl Config {
    /// The effective allow-list: `overrides` (from `--allow`, each entry may be
    /// comma separated) replace the configured rules when present. An empty
    /// result is a configuration error.
    pub fn allow_list(&self, overrides: &[String]) -> Result<AllowList, ConfigError> {
        let allow = if overrides.is_empty() {
            AllowList::new(&self.audit.allow)
        } else {
            AllowList::new(overrides.iter().flat_map(|o| o.split(',')))
        };

        if allow.is_empty() {
            return Err(ConfigError::EmptyAllowList(self.describe_source()));
        }
        Ok(allow)
    }

    fn describe_source(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => format!("{}/{}", CONFIG_DIR, CONFIG_FILE),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.workspace-licenses/config.toml`
/// 3. `~/.config/workspace-licenses/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(CONFIG_DIR).join(CONFIG_FILE);
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("workspace-licenses")
            .join(CONFIG_FILE);
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.source = Some(path.to_path_buf());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_project_config(dir: &Path, content: &str) {
        let config_dir = dir.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_project_config() {
        let dir = tempfile::tempdir().unwrap();
        write_project_config(
            dir.path(),
            r#"
[collect]
dev = true
recursive_npm = true
concurrency = 2

[audit]
allow = ["MIT", "ISC"]
"#,
        );

        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(
            config.collect.options(),
            CollectOptions {
                include_dev: true,
                recursive_workspaces: false,
                recursive_npm: true,
            }
        );
        assert_eq!(config.collect.concurrency, 2);
        assert_eq!(config.audit.allow, vec!["MIT", "ISC"]);
        assert!(config.source.is_some());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[collect]\nrecursive_workspaces = true\n").unwrap();

        let config = load_config(dir.path(), Some(&path)).unwrap();
        assert!(config.collect.recursive_workspaces);
        assert_eq!(config.collect.concurrency, 8);
        assert!(config.audit.allow.contains(&"MIT".to_string()));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[collect\n").unwrap();
        assert!(matches!(
            load_config(dir.path(), Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            load_config(dir.path(), Some(&dir.path().join("missing.toml"))),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_allow_list_overrides() {
        let config = Config::default();
        let allow = config
            .allow_list(&["MIT,ISC".to_string(), "Apache-2.0".to_string()])
            .unwrap();
        assert_eq!(allow.rules(), ["MIT", "ISC", "Apache-2.0"]);

        let defaults = config.allow_list(&[]).unwrap();
        assert_eq!(defaults.len(), 6);
    }

    #[test]
    fn test_empty_allow_list_is_rejected() {
        let config = Config {
            audit: AuditConfig { allow: Vec::new() },
            ..Config::default()
        };
        assert!(matches!(
            config.allow_list(&[]),
            Err(ConfigError::EmptyAllowList(_))
        ));
        assert!(config.allow_list(&[" , ".to_string()]).is_err());
    }
}
