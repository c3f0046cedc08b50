//! code-assistant: repository access and scratch storage for code-assistant agents
//!
//! Two components live here:
//! - the repository access layer ([`fetch`], [`scan`], [`utils::read_file_content`]),
//!   which clones or refreshes a working copy, lists its files and decodes their text;
//! - the [`storage::StorageManager`], a best-effort JSON key/value store laid out
//!   as a directory tree.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod scan;
pub mod storage;
pub mod utils;

pub use domain::{CloneOptions, Config, FileContent, ListOptions, Namespace};
pub use error::{AccessError, StoreError};
pub use fetch::{acquire_repository, RepositoryHandle};
pub use scan::list_files;
pub use storage::StorageManager;
pub use utils::read_file_content;
