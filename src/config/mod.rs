//! Settings for the workspace, the record store and file reading
//!
//! Layers, lowest first: defaults, `code-assistant.{toml,yml}`,
//! `CODE_ASSISTANT_*` variables, command line flags.

pub mod loader;
pub mod merge;

pub use crate::domain::Config;
pub use loader::load_config;
pub use merge::{apply_env_overrides, merge_cli_with_config, CliOverrides, ENV_PREFIX};
