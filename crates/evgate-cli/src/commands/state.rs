use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use evgate_core::StateStore;

use crate::cli::OutputFormat;
use crate::context;
use crate::output::{print_json, print_success, print_table};

pub async fn show(path: &Path, format: OutputFormat) -> Result<()> {
    let store = context::state_store(path);
    let state = store.load().await.context("Failed to read state")?;

    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(&state)?),
        OutputFormat::Table => {
            println!("{}: {}", "State".cyan(), path.display());
            let rows = state
                .functions
                .iter()
                .map(|id| ["function".to_string(), id.to_string()])
                .chain(
                    state
                        .subscriptions
                        .iter()
                        .map(|id| ["subscription".to_string(), id.clone()]),
                )
                .collect();
            print_table(["Kind", "ID"], rows, "No tracked gateway objects.");
        }
    }
    Ok(())
}

pub async fn clear(path: &Path) -> Result<()> {
    let store = context::state_store(path);
    let state = store.load().await.context("Failed to read state")?;
    if store.clear().await? {
        print_success(&format!(
            "Forgot {} function(s) and {} subscription(s); gateway left untouched",
            state.functions.len(),
            state.subscriptions.len()
        ));
    } else {
        println!("No state file at {}", path.display());
    }
    Ok(())
}
