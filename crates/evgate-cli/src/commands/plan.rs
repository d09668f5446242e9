use anyhow::Result;
use evgate_core::reconcile::build_plan;

use crate::cli::OutputFormat;
use crate::context::{self, Deployment};
use crate::output::{print_json, print_table, short_id};

pub fn plan(
    deployment: &Deployment,
    outputs_path: &std::path::Path,
    format: OutputFormat,
) -> Result<()> {
    let outputs = context::load_outputs(outputs_path)?;
    let plan = build_plan(
        &deployment.gateway,
        &outputs,
        &deployment.declarations,
        deployment.region(),
    )?;

    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(&plan)?),
        OutputFormat::Table => {
            let rows = plan
                .functions
                .iter()
                .flat_map(|f| {
                    f.subscriptions.iter().map(move |s| {
                        [
                            f.name.clone(),
                            short_id(f.function_id.as_str()),
                            s.event.clone(),
                            s.method.clone().unwrap_or_else(|| "-".to_string()),
                            s.path.clone(),
                        ]
                    })
                })
                .collect();
            print_table(
                ["Function", "FunctionId", "Event", "Method", "Path"],
                rows,
                "No functions declare eventgateway events.",
            );
        }
    }
    Ok(())
}
