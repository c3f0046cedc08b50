//! Error types for the repository access layer and the storage manager.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by repository acquisition and file listing.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Invalid repository locator: {0}")]
    InvalidLocator(String),

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed cloning repository from {locator}: {message}")]
    Clone { locator: String, message: String },

    #[error("Failed updating working copy {}: {message}", .path.display())]
    Pull { path: PathBuf, message: String },

    #[error("Could not lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the typed storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
