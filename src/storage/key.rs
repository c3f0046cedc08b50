//! Storage key resolution
//!
//! Keys are `/`-delimited; each segment becomes a directory and the last one a
//! `<name>.json` file. Segments that could escape the storage root are refused.

use crate::error::StoreError;
use crate::utils::relative_slash_path;
use std::path::{Path, PathBuf};

pub const RECORD_EXTENSION: &str = ".json";

/// File path of the record stored under `key`.
pub fn resolve_key(root: &Path, key: &str) -> Result<PathBuf, StoreError> {
    let segments = validate(key)?;
    let mut path = root.to_path_buf();
    let last = segments.len() - 1;
    for (idx, segment) in segments.iter().enumerate() {
        if idx == last && !segment.ends_with(RECORD_EXTENSION) {
            path.push(format!("{segment}{RECORD_EXTENSION}"));
        } else {
            path.push(segment);
        }
    }
    Ok(path)
}

/// Directory holding the records whose keys start with `prefix`.
pub fn resolve_prefix(root: &Path, prefix: &str) -> Result<PathBuf, StoreError> {
    if prefix.trim_matches('/').is_empty() {
        return Ok(root.to_path_buf());
    }
    let segments = validate(prefix)?;
    let mut path = root.to_path_buf();
    path.extend(segments);
    Ok(path)
}

/// Key of the record at `path`, `None` for files that are not records.
pub fn key_from_path(root: &Path, path: &Path) -> Option<String> {
    let rel = relative_slash_path(root, path)?;
    rel.strip_suffix(RECORD_EXTENSION).filter(|k| !k.is_empty() && !k.ends_with('/')).map(str::to_string)
}

fn validate(key: &str) -> Result<Vec<&str>, StoreError> {
    let invalid = |reason| StoreError::InvalidKey { key: key.to_string(), reason };

    let trimmed = key.trim_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("key is empty"));
    }
    if trimmed.contains(['\\', '\0']) || (cfg!(windows) && trimmed.contains(':')) {
        return Err(invalid("key contains a reserved character"));
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    for segment in &segments {
        match *segment {
            "" => return Err(invalid("key has an empty segment")),
            "." | ".." => return Err(invalid("key escapes the storage root")),
            _ => {}
        }
    }
    if segments.last().is_some_and(|s| *s == RECORD_EXTENSION) {
        return Err(invalid("key has no name"));
    }
    Ok(segments)
}
