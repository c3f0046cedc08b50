//! Glob-filtered file listing

use crate::domain::{ListOptions, DEFAULT_EXCLUDES, DEFAULT_PATTERN};
use crate::error::AccessError;
use crate::utils::relative_slash_path;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// List the entries under `root` matching the include pattern and none of the
/// exclusions (defaults plus `options.exclude`).
///
/// Patterns are matched against the `/`-separated path relative to `root`.
/// Returned paths are absolute and sorted.
pub fn list_files(root: &Path, options: &ListOptions) -> Result<Vec<PathBuf>, AccessError> {
    if !root.is_dir() {
        return Err(AccessError::NotADirectory(root.to_path_buf()));
    }
    let root = root.canonicalize()?;

    let pattern = options.pattern.as_deref().unwrap_or(DEFAULT_PATTERN);
    let include = build_globset([pattern])?;
    let exclude = Arc::new(build_globset(
        DEFAULT_EXCLUDES.iter().copied().chain(options.exclude.iter().map(String::as_str)),
    )?);

    let mut builder = WalkBuilder::new(&root);
    builder
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .require_git(false)
        .parents(options.respect_gitignore)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    // Prune excluded directories instead of walking into them.
    let prune_root = root.clone();
    let prune = Arc::clone(&exclude);
    builder.filter_entry(move |entry| {
        if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
            return true;
        }
        match relative_slash_path(&prune_root, entry.path()) {
            Some(rel) => !is_excluded_dir(&prune, &rel),
            None => true,
        }
    });

    let mut files = Vec::new();
    for entry_result in builder.build() {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if options.files_only && !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let Some(rel_path) = relative_slash_path(&root, entry.path()) else {
            continue;
        };
        if exclude.is_match(&rel_path) || (is_dir && is_excluded_dir(&exclude, &rel_path)) {
            continue;
        }
        if !include.is_match(&rel_path) {
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    tracing::debug!("listed {} entries under {}", files.len(), root.display());
    Ok(files)
}

/// A directory is excluded when it matches a pattern itself or when every path
/// beneath it would (`**/name/**`).
fn is_excluded_dir(set: &GlobSet, rel_dir: &str) -> bool {
    set.is_match(rel_dir) || set.is_match(format!("{rel_dir}/"))
}

fn build_globset<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<GlobSet, AccessError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern).literal_separator(true).build().map_err(|e| {
            AccessError::InvalidPattern { pattern: pattern.to_string(), message: e.to_string() }
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| AccessError::InvalidPattern {
        pattern: "<set>".to_string(),
        message: e.to_string(),
    })
}
