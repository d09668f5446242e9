use anyhow::Result;
use colored::Colorize;
use evgate_core::{ReconcileOptions, Reconciler};
use serde_json::json;

use crate::cli::{OutputFormat, ReconcileArgs};
use crate::context::{self, Deployment};
use crate::output::{print_json, print_success, print_table, short_id};

pub async fn reconcile(
    deployment: &Deployment,
    outputs_path: &std::path::Path,
    state_path: &std::path::Path,
    args: &ReconcileArgs,
    format: OutputFormat,
) -> Result<()> {
    let outputs = context::load_outputs(outputs_path)?;
    let options = ReconcileOptions::default()
        .with_region(deployment.region())
        .with_teardown_concurrency(args.concurrency);
    let reconciler = Reconciler::new(deployment.client(), context::state_store(state_path))
        .with_options(options);

    let result = reconciler
        .run(&deployment.gateway, &outputs, &deployment.declarations)
        .await?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "removedSubscriptions": result.removed_subscriptions,
            "removedFunctions": result.removed_functions,
            "registeredFunctions": result.registered_functions,
            "createdSubscriptions": result.created_subscriptions,
            "state": result.state,
        })),
        OutputFormat::Table => {
            if !result.removed_subscriptions.is_empty() || !result.removed_functions.is_empty() {
                println!(
                    "Removed {} subscription(s) and {} function(s) from previous deploy",
                    result.removed_subscriptions.len(),
                    result.removed_functions.len()
                );
            }
            let rows = result
                .state
                .functions
                .iter()
                .map(|id| [short_id(id.as_str()), "function".to_string()])
                .chain(
                    result
                        .state
                        .subscriptions
                        .iter()
                        .map(|id| [id.clone(), "subscription".to_string()]),
                )
                .collect();
            print_table(["ID", "Kind"], rows, "Nothing registered.");
            print_success(&format!(
                "Event gateway {} is in sync ({} function(s), {} subscription(s))",
                deployment.gateway.subdomain.cyan(),
                result.registered_functions.len(),
                result.created_subscriptions.len()
            ));
        }
    }
    Ok(())
}
