//! Core data types shared by the access layer, the storage manager and the CLI.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Default size threshold for reading a file (1 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1_048_576;

/// Default clone depth (shallow clone of the tip).
pub const DEFAULT_CLONE_DEPTH: u32 = 1;

/// Default include pattern for file listing.
pub const DEFAULT_PATTERN: &str = "**/*";

/// Directories and assets skipped by every listing unless the caller overrides
/// the pattern set entirely.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    // dependency directories
    "**/node_modules/**",
    "**/bower_components/**",
    "**/vendor/**",
    // build output
    "**/dist/**",
    "**/build/**",
    "**/out/**",
    "**/target/**",
    "**/coverage/**",
    // version control metadata
    "**/.git/**",
    "**/.svn/**",
    "**/.hg/**",
    // compiled and minified assets
    "**/__pycache__/**",
    "**/*.pyc",
    "**/*.class",
    "**/*.o",
    "**/*.so",
    "**/*.dll",
    "**/*.exe",
    "**/*.min.js",
    "**/*.min.css",
    "**/*.map",
    // virtual environments
    "**/venv/**",
    "**/.venv/**",
];

/// Flat settings object read before the components initialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root under which working copies are cloned, one subdirectory per repository.
    pub workspace_dir: PathBuf,
    /// Root of the JSON record store.
    pub storage_dir: PathBuf,
    /// Shallow clone depth; 0 clones the full history.
    pub clone_depth: u32,
    pub branch: Option<String>,
    pub single_branch: bool,
    pub include_glob: Option<String>,
    #[serde(deserialize_with = "string_or_list")]
    pub exclude_globs: Vec<String>,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    pub max_file_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("repos"),
            storage_dir: PathBuf::from("data"),
            clone_depth: DEFAULT_CLONE_DEPTH,
            branch: None,
            single_branch: true,
            include_glob: None,
            exclude_globs: Vec::new(),
            include_hidden: false,
            respect_gitignore: false,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl Config {
    pub fn clone_options(&self) -> CloneOptions {
        CloneOptions {
            depth: self.clone_depth,
            branch: self.branch.clone(),
            single_branch: self.single_branch,
        }
    }

    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            pattern: self.include_glob.clone(),
            exclude: self.exclude_globs.clone(),
            files_only: true,
            include_hidden: self.include_hidden,
            respect_gitignore: self.respect_gitignore,
        }
    }
}

/// Accept either `"a, b"` or `["a", "b"]`, trimming entries and dropping empties.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
        StringOrList::Many(v) => v,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}

/// Parameters for cloning a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOptions {
    /// History depth; 0 means full history.
    pub depth: u32,
    /// Branch to check out; `None` uses the remote default.
    pub branch: Option<String>,
    /// Fetch only `branch` rather than every remote branch.
    pub single_branch: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self { depth: DEFAULT_CLONE_DEPTH, branch: None, single_branch: true }
    }
}

/// Parameters for listing files under a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Include pattern, `**/*` when unset.
    pub pattern: Option<String>,
    /// Extra exclusions merged with [`DEFAULT_EXCLUDES`].
    pub exclude: Vec<String>,
    pub files_only: bool,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            pattern: None,
            exclude: Vec::new(),
            files_only: true,
            include_hidden: false,
            respect_gitignore: false,
        }
    }
}

/// Result of reading a file: decoded text, or a marker explaining why there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileContent {
    Text { path: PathBuf, content: String, encoding: String },
    Binary { path: PathBuf },
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    Unreadable { path: PathBuf, message: String },
}

impl FileContent {
    pub fn path(&self) -> &Path {
        match self {
            FileContent::Text { path, .. }
            | FileContent::Binary { path }
            | FileContent::TooLarge { path, .. }
            | FileContent::Unreadable { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileContent::Text { .. })
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, FileContent::Binary { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FileContent::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn encoding(&self) -> Option<&str> {
        match self {
            FileContent::Text { encoding, .. } => Some(encoding),
            _ => None,
        }
    }

    /// Human-readable reason for a failed read, `None` on success.
    pub fn error_message(&self) -> Option<String> {
        match self {
            FileContent::Text { .. } => None,
            FileContent::Binary { .. } => Some("binary file skipped".to_string()),
            FileContent::TooLarge { size, limit, .. } => {
                Some(format!("file too large ({size} bytes, limit {limit})"))
            }
            FileContent::Unreadable { message, .. } => Some(message.clone()),
        }
    }
}

/// The fixed top-level directories of the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Issues,
    Cache,
    Reports,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Issues, Namespace::Cache, Namespace::Reports];

    pub fn dir(self) -> &'static str {
        match self {
            Namespace::Issues => "issues",
            Namespace::Cache => "cache",
            Namespace::Reports => "reports",
        }
    }

    /// Build a storage key inside this namespace.
    pub fn key(self, name: &str) -> String {
        format!("{}/{}", self.dir(), name.trim_start_matches('/'))
    }
}
