//! Command-line interface for code-assistant
//!
//! Every subcommand is a thin wrapper over one library operation: `fetch`
//! acquires a repository, `ls` / `cat` / `dump` read it, `store` manages the
//! JSON record store.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{self, Config};

mod fetch;
mod read;
mod store;
mod utils;

/// Fetch repositories, read their files and keep scratch results as JSON
#[derive(Parser)]
#[command(name = "code-assistant")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: code-assistant.toml/.yml in the current directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone a repository into the workspace, or refresh an existing copy
    Fetch(fetch::FetchArgs),

    /// List files under a directory
    Ls(read::ListArgs),

    /// Print the decoded contents of a file
    Cat(read::CatArgs),

    /// List and read every file under a directory
    Dump(read::DumpArgs),

    /// Manage the JSON record store
    Store(store::StoreArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "code-assistant", &mut std::io::stdout());
        return Ok(());
    }

    let config = base_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch(args) => fetch::run(args, config),
        Commands::Ls(args) => read::run_list(args, config),
        Commands::Cat(args) => read::run_cat(args, config),
        Commands::Dump(args) => read::run_dump(args, config),
        Commands::Store(args) => store::run(args, config),
        Commands::Completions { .. } => Ok(()),
    }
}

/// File config (explicit or discovered in the current directory) with env overrides.
fn base_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let file_config = config::load_config(&cwd, config_path)?;
    config::apply_env_overrides(file_config)
}
