//! Handle on an acquired working copy

use crate::domain::{FileContent, ListOptions};
use crate::error::AccessError;
use crate::scan::list_files;
use crate::utils::{read_file_content, relative_slash_path};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// A working copy on local disk and the parameters it was acquired with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// The URL or path the caller asked for.
    pub locator: String,
    pub local_path: PathBuf,
    /// Short name of the checked-out branch, `None` when detached or not a git checkout.
    pub default_branch: Option<String>,
    pub depth: u32,
    pub max_file_bytes: u64,
    /// True when the copy was already on disk (refreshed or used in place).
    pub already_existed: bool,
}

impl RepositoryHandle {
    /// List files in the working copy.
    pub fn list_files(&self, options: &ListOptions) -> Result<Vec<PathBuf>, AccessError> {
        list_files(&self.local_path, options)
    }

    /// Read one file; relative paths resolve against the working copy.
    pub fn read_file(&self, path: &Path) -> FileContent {
        let resolved =
            if path.is_absolute() { path.to_path_buf() } else { self.local_path.join(path) };
        read_file_content(&resolved, Some(self.max_file_bytes))
    }

    /// Read many files in parallel. Results keep the order of `paths`.
    pub fn read_files(&self, paths: &[PathBuf]) -> Vec<FileContent> {
        paths.par_iter().map(|path| self.read_file(path)).collect()
    }

    /// `path` relative to the working copy, `/`-separated.
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        relative_slash_path(&self.local_path, path)
    }
}
