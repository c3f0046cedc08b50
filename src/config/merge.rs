//! Environment and command-line overrides layered over the file config

use crate::domain::Config;
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::path::PathBuf;

/// Prefix of environment overrides, e.g. `CODE_ASSISTANT_CLONE_DEPTH=0`.
pub const ENV_PREFIX: &str = "CODE_ASSISTANT_";

/// Apply `CODE_ASSISTANT_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: Config) -> Result<Config> {
    Figment::from(Serialized::defaults(config))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .with_context(|| format!("Invalid {ENV_PREFIX}* environment override"))
}

/// Values given on the command line. `None` leaves the config untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub workspace_dir: Option<PathBuf>,
    pub storage_dir: Option<PathBuf>,
    pub clone_depth: Option<u32>,
    pub branch: Option<String>,
    pub single_branch: Option<bool>,
    pub include_glob: Option<String>,
    /// Appended to the configured exclusions.
    pub exclude_globs: Option<Vec<String>>,
    pub include_hidden: Option<bool>,
    pub respect_gitignore: Option<bool>,
    pub max_file_bytes: Option<u64>,
}

pub fn merge_cli_with_config(mut config: Config, cli: &CliOverrides) -> Config {
    if let Some(dir) = &cli.workspace_dir {
        config.workspace_dir = dir.clone();
    }
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = dir.clone();
    }
    if let Some(depth) = cli.clone_depth {
        config.clone_depth = depth;
    }
    if let Some(branch) = &cli.branch {
        config.branch = Some(branch.clone());
    }
    if let Some(single) = cli.single_branch {
        config.single_branch = single;
    }
    if let Some(pattern) = &cli.include_glob {
        config.include_glob = Some(pattern.clone());
    }
    if let Some(globs) = &cli.exclude_globs {
        config.exclude_globs.extend(globs.iter().cloned());
    }
    if let Some(hidden) = cli.include_hidden {
        config.include_hidden = hidden;
    }
    if let Some(gitignore) = cli.respect_gitignore {
        config.respect_gitignore = gitignore;
    }
    if let Some(max) = cli.max_file_bytes {
        config.max_file_bytes = max;
    }
    config
}
