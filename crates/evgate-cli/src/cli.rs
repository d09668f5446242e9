use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "evgate")]
#[command(about = "evgate — sync serverless function events with an event gateway")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Deployment descriptor (YAML, JSON or TOML)
    #[arg(short, long, global = true, env = "EVGATE_CONFIG", default_value = "serverless.yml")]
    pub config: PathBuf,

    /// Deployment outputs JSON (flat map or CloudFormation describe-stacks)
    #[arg(
        short,
        long,
        global = true,
        env = "EVGATE_OUTPUTS",
        default_value = ".serverless/stack-outputs.json"
    )]
    pub outputs: PathBuf,

    /// Reconciliation state file
    #[arg(
        long,
        global = true,
        env = "EVGATE_STATE",
        default_value = evgate_core::state::DEFAULT_STATE_PATH
    )]
    pub state: PathBuf,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "EVGATE_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace gateway functions and subscriptions with the deployment's declared set
    #[command(alias = "deploy")]
    Reconcile(ReconcileArgs),
    /// Show what reconcile would register, without calling the gateway
    Plan,
    /// Emit an event to the gateway
    Emit(EmitArgs),
    /// Inspect or reset the local reconciliation state
    State(StateArgs),
    /// Print the IAM template fragment for the gateway's invoke user
    IamTemplate,
}

#[derive(clap::Args)]
pub struct ReconcileArgs {
    /// Maximum teardown calls in flight
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}

#[derive(clap::Args)]
pub struct EmitArgs {
    /// Event name (e.g. user.created)
    #[arg(short, long)]
    pub event: String,
    /// JSON-encoded event data
    #[arg(short, long)]
    pub data: String,
}

#[derive(clap::Args)]
pub struct StateArgs {
    #[command(subcommand)]
    pub command: StateCommands,
}

#[derive(Subcommand)]
pub enum StateCommands {
    /// Show tracked functions and subscriptions
    Show,
    /// Forget tracked objects without touching the gateway
    Clear,
}
