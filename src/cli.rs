// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the deploy subcommand, its arguments, and global output flags.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pipedeploy")]
#[command(about = "Deploy pipelines to a remote control plane and wait for them to run")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a pipeline from a repository
    Deploy(DeployArgs),
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Pipeline name (derived from the repository when omitted)
    #[arg(short = 'p', long)]
    pub name: Option<String>,

    /// Target namespace (defaults to PIPEDEPLOY_NAMESPACE)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Repository URL holding the pipeline definition
    #[arg(short, long)]
    pub repository: String,

    /// Branch to deploy
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Wait for the deployment to finish, streaming its logs
    #[arg(short, long)]
    pub wait: bool,

    /// Do nothing if the pipeline is already deployed
    #[arg(long)]
    pub skip_if_exists: bool,

    /// How long to wait for the deployment (0 waits forever)
    #[arg(short, long, default_value = "5m", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Pipeline variable as KEY=VALUE (repeatable)
    #[arg(short = 'v', long = "var")]
    pub variables: Vec<String>,

    /// Pipeline definition file inside the repository
    #[arg(short, long)]
    pub file: Option<String>,

    /// Deprecated alias of --file
    #[arg(long, hide = true)]
    pub filename: Option<String>,
}

fn parse_duration(value: &str) -> Result<Duration, humantime::DurationError> {
    if value.trim() == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(value)
}
