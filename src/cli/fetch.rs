//! Fetch command implementation

use anyhow::Result;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{merge_cli_with_config, CliOverrides, Config};
use crate::fetch::acquire_with_config;

#[derive(Args)]
pub struct FetchArgs {
    /// Repository URL (https, ssh, file) or local directory
    #[arg(value_name = "LOCATOR")]
    pub locator: String,

    /// Directory working copies are cloned into
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Clone depth (0 for full history)
    #[arg(long, value_name = "N")]
    pub depth: Option<u32>,

    /// Branch to clone
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Fetch every branch instead of only the requested one
    #[arg(long)]
    pub no_single_branch: bool,

    /// Skip files larger than this when reading (bytes)
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,
}

pub fn run(args: FetchArgs, config: Config) -> Result<()> {
    let overrides = CliOverrides {
        workspace_dir: args.workspace,
        clone_depth: args.depth,
        branch: args.branch,
        single_branch: args.no_single_branch.then_some(false),
        max_file_bytes: args.max_file_bytes,
        ..CliOverrides::default()
    };
    let config = merge_cli_with_config(config, &overrides);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching {}", args.locator));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = acquire_with_config(&args.locator, &config);
    spinner.finish_and_clear();

    let handle = result?;
    let status = if handle.already_existed {
        style("existing").yellow()
    } else {
        style("cloned").green()
    };
    println!("{} {}", status, handle.local_path.display());
    if let Some(branch) = &handle.default_branch {
        println!("Branch: {}", branch);
    }
    Ok(())
}
