mod cli;
mod commands;
mod context;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, StateCommands};
use context::Deployment;
use output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Reconcile(args) => {
            let deployment = Deployment::load(&cli.config)?;
            commands::reconcile::reconcile(&deployment, &cli.outputs, &cli.state, args, format)
                .await?;
        }
        Commands::Plan => {
            let deployment = Deployment::load(&cli.config)?;
            commands::plan::plan(&deployment, &cli.outputs, format)?;
        }
        Commands::Emit(args) => {
            let deployment = Deployment::load(&cli.config)?;
            commands::emit::emit(&deployment, args).await?;
        }
        Commands::State(args) => match &args.command {
            StateCommands::Show => commands::state::show(&cli.state, format).await?,
            StateCommands::Clear => commands::state::clear(&cli.state).await?,
        },
        Commands::IamTemplate => {
            commands::iam::template(&cli.config)?;
        }
    }

    Ok(())
}
