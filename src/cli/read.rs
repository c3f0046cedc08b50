//! `ls`, `cat` and `dump` command implementations

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;

use super::utils::{flag, parse_csv};
use crate::config::{merge_cli_with_config, CliOverrides, Config};
use crate::domain::FileContent;
use crate::fetch::RepositoryHandle;
use crate::scan::list_files;
use crate::utils::read_file_content;

#[derive(Args)]
pub struct ListArgs {
    /// Directory to list
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Include pattern (default: **/*)
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Additional exclusions (comma-separated globs)
    #[arg(short, long, value_name = "GLOBS")]
    pub exclude: Option<String>,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Honor .gitignore files
    #[arg(long)]
    pub gitignore: bool,

    /// List matching directories as well as files
    #[arg(long)]
    pub dirs: bool,
}

impl ListArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            include_glob: self.pattern.clone(),
            exclude_globs: parse_csv(&self.exclude),
            include_hidden: flag(self.hidden),
            respect_gitignore: flag(self.gitignore),
            ..CliOverrides::default()
        }
    }
}

#[derive(Args)]
pub struct CatArgs {
    /// File to print
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Refuse files larger than this (bytes)
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,
}

#[derive(Args)]
pub struct DumpArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Skip files larger than this (bytes)
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,

    /// Emit one JSON object per file instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn run_list(args: ListArgs, config: Config) -> Result<()> {
    let config = merge_cli_with_config(config, &args.overrides());
    let mut options = config.list_options();
    options.files_only = !args.dirs;

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", args.path.display()))?;
    for path in list_files(&root, &options)? {
        println!("{}", path.strip_prefix(&root).unwrap_or(&path).display());
    }
    Ok(())
}

pub fn run_cat(args: CatArgs, config: Config) -> Result<()> {
    let overrides =
        CliOverrides { max_file_bytes: args.max_file_bytes, ..CliOverrides::default() };
    let config = merge_cli_with_config(config, &overrides);

    match read_file_content(&args.file, Some(config.max_file_bytes)) {
        FileContent::Text { content, .. } => {
            print!("{}", content);
            Ok(())
        }
        FileContent::Unreadable { path, message } => {
            anyhow::bail!("Failed to read {}: {}", path.display(), message)
        }
        other => {
            let reason = other.error_message().unwrap_or_default();
            eprintln!("{}: {}", style(other.path().display()).dim(), reason);
            Ok(())
        }
    }
}

pub fn run_dump(args: DumpArgs, config: Config) -> Result<()> {
    let mut overrides = args.list.overrides();
    overrides.max_file_bytes = args.max_file_bytes;
    let config = merge_cli_with_config(config, &overrides);

    let handle = RepositoryHandle {
        locator: args.list.path.display().to_string(),
        local_path: args.list.path.canonicalize().with_context(|| {
            format!("Path does not exist: {}", args.list.path.display())
        })?,
        default_branch: None,
        depth: config.clone_depth,
        max_file_bytes: config.max_file_bytes,
        already_existed: true,
    };

    let files = handle.list_files(&config.list_options())?;
    let contents = handle.read_files(&files);

    let mut decoded = 0usize;
    for content in &contents {
        let rel = handle.relative_path(content.path()).unwrap_or_default();
        if args.json {
            let line = serde_json::to_string(content)?;
            println!("{}", line);
            continue;
        }
        match content {
            FileContent::Text { content: text, encoding, .. } => {
                decoded += 1;
                println!("{}  {}  {} lines", rel, style(encoding).cyan(), text.lines().count());
            }
            other => {
                let reason = other.error_message().unwrap_or_default();
                println!("{}  {}", rel, style(reason).yellow());
            }
        }
    }
    if !args.json {
        println!("{} of {} files decoded", decoded, contents.len());
    }
    Ok(())
}
