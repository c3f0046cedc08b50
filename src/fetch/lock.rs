//! Per-working-copy advisory lock

use crate::error::AccessError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive lock on `<workspace>/.<name>.lock`, released on drop.
///
/// Serializes the exists-check and the clone/pull that follows it, across
/// threads and processes.
pub struct WorkingCopyLock {
    file: File,
    path: PathBuf,
}

impl WorkingCopyLock {
    /// Block until the lock for `name` under `workspace_root` is held.
    pub fn acquire(workspace_root: &Path, name: &str) -> Result<Self, AccessError> {
        let path = workspace_root.join(format!(".{name}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| AccessError::Lock { path: path.clone(), source })?;

        FileExt::lock_exclusive(&file)
            .map_err(|source| AccessError::Lock { path: path.clone(), source })?;
        tracing::debug!("locked {}", path.display());

        Ok(Self { file, path })
    }
}

impl Drop for WorkingCopyLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
