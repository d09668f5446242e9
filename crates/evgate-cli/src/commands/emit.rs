use anyhow::Result;
use colored::Colorize;

use crate::cli::EmitArgs;
use crate::context::Deployment;
use crate::output::{print_json, print_success};

pub async fn emit(deployment: &Deployment, args: &EmitArgs) -> Result<()> {
    let client = deployment.client();
    let data = evgate_core::emit(client.as_ref(), &args.event, &args.data).await?;
    print_success(&format!(
        "Event {} emitted to {}",
        args.event.cyan(),
        deployment.gateway.events_url.as_str().cyan()
    ));
    print_json(&data);
    Ok(())
}
