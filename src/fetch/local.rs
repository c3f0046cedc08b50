//! Local path validation

use crate::error::AccessError;
use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a `.git` entry.
///
/// Returns the nearest ancestor (or `start` itself) containing `.git`, or
/// `start` unchanged when there is none.
pub fn find_repo_root(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();
    loop {
        if current.join(".git").exists() {
            if current != start {
                tracing::info!(
                    "using repository root {} (detected from {})",
                    current.display(),
                    start.display()
                );
            }
            return current;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    tracing::debug!("no .git found; using {} as repository root", start.display());
    start.to_path_buf()
}

/// Canonicalize a local locator and resolve its repository root.
pub fn validate_local_path(path: &Path) -> Result<PathBuf, AccessError> {
    let canonical =
        path.canonicalize().map_err(|_| AccessError::NotADirectory(path.to_path_buf()))?;

    if !canonical.is_dir() {
        return Err(AccessError::NotADirectory(path.to_path_buf()));
    }

    Ok(find_repo_root(&canonical))
}
