//! Repository acquisition (clone, refresh, or use in place)

use crate::domain::{CloneOptions, Config};
use crate::error::AccessError;
use git2::Repository;
use std::path::{Path, PathBuf};

pub mod clone;
pub mod context;
pub mod local;
pub mod locator;
pub mod lock;
pub mod pull;

pub use context::RepositoryHandle;
pub use locator::{working_copy_name, Locator};
pub use pull::PullOutcome;

/// Obtain a working copy for `locator`.
///
/// - Local directory → used in place (`already_existed = true`)
/// - Remote, copy already under `workspace_root` → pulled (`already_existed = true`)
/// - Remote, no copy yet → shallow-cloned into `workspace_root/<name>`
///
/// The exists-check and the clone/pull run under a per-copy lock, so
/// concurrent callers for the same locator clone at most once.
pub fn acquire_repository(
    locator: &str,
    workspace_root: &Path,
    options: &CloneOptions,
    max_file_bytes: u64,
) -> Result<RepositoryHandle, AccessError> {
    match Locator::parse(locator)? {
        Locator::Local(path) => {
            let root = local::validate_local_path(&path)?;
            Ok(RepositoryHandle {
                locator: locator.to_string(),
                default_branch: head_branch(&root),
                local_path: root,
                depth: options.depth,
                max_file_bytes,
                already_existed: true,
            })
        }
        Locator::Remote(url) => {
            let (local_path, already_existed) = acquire_remote(&url, workspace_root, options)?;
            Ok(RepositoryHandle {
                locator: locator.to_string(),
                default_branch: head_branch(&local_path),
                local_path,
                depth: options.depth,
                max_file_bytes,
                already_existed,
            })
        }
    }
}

/// [`acquire_repository`] with workspace, clone options and size limit taken from `config`.
pub fn acquire_with_config(locator: &str, config: &Config) -> Result<RepositoryHandle, AccessError> {
    acquire_repository(
        locator,
        &config.workspace_dir,
        &config.clone_options(),
        config.max_file_bytes,
    )
}

fn acquire_remote(
    url: &str,
    workspace_root: &Path,
    options: &CloneOptions,
) -> Result<(PathBuf, bool), AccessError> {
    let name = working_copy_name(url)?;
    std::fs::create_dir_all(workspace_root)?;
    let workspace_root = workspace_root.canonicalize()?;
    let local_path = workspace_root.join(&name);

    let _guard = lock::WorkingCopyLock::acquire(&workspace_root, &name)?;

    if local_path.exists() {
        let outcome = pull::pull_repository(&local_path)?;
        tracing::info!("Updated {} ({:?})", local_path.display(), outcome);
        return Ok((local_path, true));
    }

    let clone_url = locator::normalize_github_url(url);
    clone::clone_repository(&clone_url, &local_path, options)?;
    tracing::info!("Cloned {} into {}", clone_url, local_path.display());
    Ok((local_path, false))
}

fn head_branch(path: &Path) -> Option<String> {
    let repo = Repository::open(path).ok()?;
    let head = repo.head().ok()?;
    if !head.is_branch() {
        return None;
    }
    let branch = head.shorthand().map(str::to_string);
    branch
}
