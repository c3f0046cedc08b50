//! `store` subcommands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde_json::Value;
use std::path::PathBuf;

use crate::config::{merge_cli_with_config, CliOverrides, Config};
use crate::storage::StorageManager;

#[derive(Args)]
pub struct StoreArgs {
    /// Storage root directory
    #[arg(short = 'd', long, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: StoreCommand,
}

#[derive(Subcommand)]
pub enum StoreCommand {
    /// Create the storage root and its issues/cache/reports directories
    Init,
    /// Store a JSON value under a key
    Put {
        key: String,
        /// JSON text, e.g. '{"a":1}'
        value: String,
    },
    /// Print the JSON value stored under a key
    Get { key: String },
    /// Delete the value stored under a key
    Rm { key: String },
    /// List keys, optionally under a prefix
    Ls {
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Delete every record
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn run(args: StoreArgs, config: Config) -> Result<()> {
    let overrides = CliOverrides { storage_dir: args.storage_dir, ..CliOverrides::default() };
    let config = merge_cli_with_config(config, &overrides);
    let store = StorageManager::from_config(&config);

    match args.command {
        StoreCommand::Init => {
            store.try_initialize()?;
            println!("Initialized {}", store.root().display());
        }
        StoreCommand::Put { key, value } => {
            let parsed: Value = serde_json::from_str(&value)
                .with_context(|| format!("Value for '{key}' is not valid JSON"))?;
            let path = store.try_save(&key, &parsed)?;
            println!("{} {}", style("saved").green(), path.display());
        }
        StoreCommand::Get { key } => match store.try_load::<Value>(&key)? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => anyhow::bail!("No record stored under '{key}'"),
        },
        StoreCommand::Rm { key } => {
            if store.try_delete(&key)? {
                println!("{} {}", style("deleted").red(), key);
            } else {
                println!("{} was not stored", key);
            }
        }
        StoreCommand::Ls { prefix } => {
            for key in store.try_list_keys(&prefix)? {
                println!("{}", key);
            }
        }
        StoreCommand::Clear { yes } => {
            if !yes {
                let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Delete every record under {}?", store.root().display()))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Aborted");
                    return Ok(());
                }
            }
            store.try_clear()?;
            println!("Cleared {}", store.root().display());
        }
    }
    Ok(())
}
