//! Repository locator parsing and working-copy naming

use crate::error::AccessError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

/// `user@host:path` (scp-style ssh remotes).
static SCP_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[^/\\]").unwrap());

/// Where a repository comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Anything git can clone: `scheme://...` or `user@host:path`.
    Remote(String),
    /// A directory on this machine, used in place.
    Local(PathBuf),
}

impl Locator {
    pub fn parse(raw: &str) -> Result<Self, AccessError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccessError::InvalidLocator("empty locator".to_string()));
        }
        if trimmed.contains("://") || SCP_LIKE.is_match(trimmed) {
            Ok(Locator::Remote(trimmed.to_string()))
        } else {
            Ok(Locator::Local(PathBuf::from(trimmed)))
        }
    }
}

/// Directory name of the working copy for a locator: its final path segment
/// with any `.git` suffix removed.
///
/// - `https://github.com/owner/repo.git` → `repo`
/// - `https://github.com/owner/repo/`    → `repo`
/// - `git@github.com:owner/repo.git`     → `repo`
/// - `git@host:repo`                     → `repo`
pub fn working_copy_name(locator: &str) -> Result<String, AccessError> {
    let without_query = locator.trim().split(['?', '#']).next().unwrap_or("");
    let trimmed = without_query.trim_end_matches(['/', '\\']);
    let segment = trimmed.rsplit(['/', '\\', ':']).next().unwrap_or("");
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        return Err(AccessError::InvalidLocator(format!(
            "cannot derive a directory name from '{locator}'"
        )));
    }
    Ok(name.to_string())
}

/// Normalize a GitHub URL to the canonical HTTPS `.git` form.
///
/// - `https://github.com/owner/repo`    → `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo/`   → `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo.git`→ unchanged
/// - non-GitHub URLs                    → unchanged (minus trailing slash)
pub fn normalize_github_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.contains("github.com") && !trimmed.ends_with(".git") {
        format!("{}.git", trimmed)
    } else {
        trimmed.to_string()
    }
}
