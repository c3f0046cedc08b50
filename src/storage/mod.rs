//! File-backed JSON key/value storage
//!
//! Records live under a root directory as pretty-printed `<key>.json` files.
//! The store is a best-effort scratch area: every operation comes in two
//! flavours, a typed `try_*` variant returning [`StoreError`], and a variant
//! that logs the failure and returns a benign value (`false`, `None`, empty).

use crate::domain::{Config, Namespace};
use crate::error::StoreError;
use crate::utils::stable_hash;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use walkdir::WalkDir;

pub mod key;

pub use key::{key_from_path, resolve_key, RECORD_EXTENSION};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON record store rooted at a directory.
#[derive(Debug)]
pub struct StorageManager {
    root: PathBuf,
    initialized: AtomicBool,
}

impl StorageManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), initialized: AtomicBool::new(false) }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.storage_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and the `issues`, `cache` and `reports` directories.
    pub fn try_initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        for namespace in Namespace::ALL {
            fs::create_dir_all(self.root.join(namespace.dir()))?;
        }
        self.initialized.store(true, Ordering::Release);
        tracing::debug!("storage initialized at {}", self.root.display());
        Ok(())
    }

    pub fn initialize(&self) -> bool {
        best_effort("initialize storage", self.try_initialize()).is_some()
    }

    fn ensure_initialized(&self) -> Result<(), StoreError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        self.try_initialize()
    }

    /// File path backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        resolve_key(&self.root, key)
    }

    /// Write `value` under `key`, replacing any previous record.
    ///
    /// The JSON is written to a temporary sibling and renamed into place.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf, StoreError> {
        self.ensure_initialized()?;
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');

        let tmp = temp_sibling(&path);
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!("saved {} -> {}", key, path.display());
        Ok(path)
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        best_effort(&format!("save '{key}'"), self.try_save(key, value)).is_some()
    }

    /// Read the record under `key`. A key never written is `Ok(None)`.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.ensure_initialized()?;
        let path = self.path_for(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        best_effort(&format!("load '{key}'"), self.try_load(key)).flatten()
    }

    /// Remove the record under `key`. Returns whether a record was removed;
    /// deleting an absent key succeeds.
    pub fn try_delete(&self, key: &str) -> Result<bool, StoreError> {
        self.ensure_initialized()?;
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("deleted {}", key);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        best_effort(&format!("delete '{key}'"), self.try_delete(key)).is_some()
    }

    /// Keys stored under `prefix` (a directory prefix, `""` for the whole store),
    /// sorted, without the `.json` suffix.
    pub fn try_list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.ensure_initialized()?;
        let base = key::resolve_prefix(&self.root, prefix)?;

        if !base.is_dir() {
            // The prefix may name a single record.
            let single = self.path_for(prefix)?;
            return Ok(if single.is_file() {
                key_from_path(&self.root, &single).into_iter().collect()
            } else {
                Vec::new()
            });
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&base).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(key) = key_from_path(&self.root, entry.path()) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    pub fn list_keys(&self, prefix: &str) -> Vec<String> {
        best_effort(&format!("list keys under '{prefix}'"), self.try_list_keys(prefix))
            .unwrap_or_default()
    }

    /// Remove everything under the root, keeping the root itself.
    pub fn try_clear(&self) -> Result<(), StoreError> {
        self.ensure_initialized()?;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        self.initialized.store(false, Ordering::Release);
        tracing::info!("cleared storage at {}", self.root.display());
        Ok(())
    }

    pub fn clear(&self) -> bool {
        best_effort("clear storage", self.try_clear()).is_some()
    }
}

/// Content-addressed key in the cache namespace for analysis of `path` at `content`.
pub fn cache_key(path: &str, content: &str) -> String {
    Namespace::Cache.key(&stable_hash(path, content))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{n}.tmp", std::process::id()))
}

fn best_effort<T>(what: &str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to {}: {}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn store() -> (TempDir, StorageManager) {
        let temp = TempDir::new().unwrap();
        let manager = StorageManager::new(temp.path().join("data"));
        (temp, manager)
    }

    #[test]
    fn initialize_creates_namespaces() {
        let (_temp, store) = store();
        assert!(store.initialize());
        assert!(store.initialize());
        for dir in ["issues", "cache", "reports"] {
            assert!(store.root().join(dir).is_dir(), "{dir} missing");
        }
    }

    #[test]
    fn operations_self_initialize() {
        let (_temp, store) = store();
        assert!(store.load::<Value>("issues/1").is_none());
        assert!(store.root().join("issues").is_dir());
    }

    #[test]
    fn save_overwrites() {
        let (_temp, store) = store();
        assert!(store.save("issues/1", &json!({"title": "first"})));
        assert!(store.save("issues/1", &json!({"title": "second"})));
        assert_eq!(store.load::<Value>("issues/1"), Some(json!({"title": "second"})));
        assert_eq!(store.list_keys("issues"), vec!["issues/1"]);
    }

    #[test]
    fn typed_round_trip() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Issue {
            title: String,
            labels: Vec<String>,
        }
        let (_temp, store) = store();
        let issue = Issue { title: "Crash".into(), labels: vec!["bug".into()] };
        assert!(store.save(&Namespace::Issues.key("crash"), &issue));
        assert_eq!(store.load::<Issue>("issues/crash"), Some(issue));
    }

    #[test]
    fn corrupt_record_loads_as_none() {
        let (_temp, store) = store();
        store.initialize();
        fs::write(store.root().join("cache").join("bad.json"), "{not json").unwrap();

        assert!(store.load::<Value>("cache/bad").is_none());
        assert!(matches!(store.try_load::<Value>("cache/bad"), Err(StoreError::Json(_))));
    }

    #[test]
    fn delete_absent_key_succeeds() {
        let (_temp, store) = store();
        assert!(store.delete("reports/never"));
        assert!(!store.try_delete("reports/never").unwrap());
    }

    #[test]
    fn invalid_keys_are_benign() {
        let (temp, store) = store();
        assert!(!store.save("../escape", &json!(1)));
        assert!(!temp.path().join("escape.json").exists());
        assert!(store.load::<Value>("../escape").is_none());
        assert!(!store.delete("../escape"));
        assert!(store.list_keys("..").is_empty());
    }

    #[test]
    fn list_keys_skips_foreign_files_and_temp_files() {
        let (_temp, store) = store();
        store.save("reports/a", &json!(1));
        store.save("reports/nested/b", &json!(2));
        fs::write(store.root().join("reports").join("notes.txt"), "x").unwrap();
        fs::write(store.root().join("reports").join(".a.json.1.0.tmp"), "x").unwrap();

        assert_eq!(store.list_keys("reports"), vec!["reports/a", "reports/nested/b"]);
        assert_eq!(store.list_keys("reports/nested"), vec!["reports/nested/b"]);
        assert_eq!(store.list_keys("reports/a"), vec!["reports/a"]);
        assert!(store.list_keys("missing").is_empty());
    }

    #[test]
    fn clear_keeps_root() {
        let (_temp, store) = store();
        store.save("issues/1", &json!(1));
        store.save("loose", &json!(2));

        assert!(store.clear());
        assert!(store.root().is_dir());
        assert_eq!(fs::read_dir(store.root()).unwrap().count(), 0);
        assert!(store.list_keys("").is_empty());

        // explicit initialize after a clear restores the layout
        assert!(store.initialize());
        assert!(store.root().join("reports").is_dir());
    }

    #[test]
    fn cache_keys_live_in_cache_namespace() {
        let key = cache_key("src/a.rs", "fn a() {}");
        assert!(key.starts_with("cache/"));
        assert_eq!(key.len(), "cache/".len() + 16);
    }
}
