//! dynasnap - command-line interface for the snapshot store
//!
//! Provisions the snapshot table and reads or writes single snapshots.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use dynasnap_store::{SnapshotStore, StoreConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dynasnap")]
#[command(about = "Snapshot store for event-sourced aggregates backed by DynamoDB")]
#[command(version)]
struct Cli {
    /// YAML config file
    #[arg(short, long, env = "DYNASNAP_CONFIG")]
    config: Option<PathBuf>,

    /// Service endpoint (e.g. http://localhost:8000 for DynamoDB Local)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Service region
    #[arg(short, long)]
    region: Option<String>,

    /// Table name
    #[arg(short, long)]
    table: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the snapshot table
    CreateTable {
        /// Wait until the table is active
        #[arg(short, long)]
        wait: bool,

        /// Seconds to wait before giving up
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Delete the snapshot table and every snapshot in it
    DeleteTable,

    /// Show the table status
    Status,

    /// Store a snapshot, replacing any snapshot at the same revision
    Store {
        /// Aggregate ID
        aggregate_id: String,

        /// Revision the snapshot was taken at
        revision: u64,

        /// State format version
        #[arg(short = 'v', long = "state-version", default_value = "1")]
        state_version: i64,

        /// State JSON (or @file.json to read from file)
        state: String,
    },

    /// Fetch the snapshot of an aggregate at a revision
    Fetch {
        /// Aggregate ID
        aggregate_id: String,

        /// Revision
        revision: u64,
    },
}

impl Cli {
    /// Resolves the store config: file, then environment, then flags.
    fn store_config(&self) -> Result<StoreConfig, dynasnap_store::ConfigError> {
        let mut config = StoreConfig::load_from(self.config.as_deref())?;

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(table) = &self.table {
            config.table_name = table.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.store_config().map_err(|e| {
        eprintln!("{}: {}", "Configuration error".red(), e);
        e
    })?;
    tracing::debug!("Using {:?}", config);

    let store = SnapshotStore::connect(&config).await?;

    match commands::execute(&store, cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}
