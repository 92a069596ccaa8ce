//! Command execution.

use crate::Commands;
use colored::Colorize;
use dynasnap_store::{SnapshotStore, SnapshotTable};
use serde_json::Value;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Executes a command and returns the formatted output.
pub async fn execute<T: SnapshotTable>(
    store: &SnapshotStore<T>,
    cmd: Commands,
) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::CreateTable { wait, timeout } => {
            store.create_table().await?;
            if wait {
                store
                    .wait_until_active(POLL_INTERVAL, Duration::from_secs(timeout))
                    .await?;
                Ok(format!(
                    "{} table {} (active)",
                    "Created".green(),
                    store.table_name().cyan()
                ))
            } else {
                Ok(format!(
                    "{} table {}",
                    "Created".green(),
                    store.table_name().cyan()
                ))
            }
        }

        Commands::DeleteTable => {
            store.delete_table().await?;
            Ok(format!(
                "{} table {}",
                "Deleted".green(),
                store.table_name().cyan()
            ))
        }

        Commands::Status => match store.table_status().await? {
            Some(status) => Ok(format!(
                "Table {}: {}",
                store.table_name().cyan(),
                status.to_string().yellow()
            )),
            None => Ok(format!(
                "Table {}: {}",
                store.table_name().cyan(),
                "does not exist".yellow()
            )),
        },

        Commands::Store {
            aggregate_id,
            revision,
            state_version,
            state,
        } => {
            let state = parse_json_arg(&state)?;
            store
                .store(&aggregate_id, revision, state_version, &state)
                .await?;
            Ok(format!(
                "{} snapshot {} at revision {} (version {})",
                "Stored".green(),
                aggregate_id.cyan(),
                revision,
                state_version
            ))
        }

        Commands::Fetch {
            aggregate_id,
            revision,
        } => match store.fetch(&aggregate_id, revision).await? {
            Some(snapshot) => Ok(format_json(&serde_json::to_value(&snapshot)?)),
            None => Ok(format!(
                "No snapshot for {} at revision {}",
                aggregate_id.cyan(),
                revision
            )
            .yellow()
            .to_string()),
        },
    }
}

/// Parses a JSON argument (either inline JSON or @file.json).
fn parse_json_arg(arg: &str) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = arg.strip_prefix('@') {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(arg)?)
    }
}

/// Formats JSON for display.
fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
