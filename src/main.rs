// ABOUTME: Entry point for the pipedeploy CLI application.
// ABOUTME: Parses arguments, sets up logging, and exits with the deploy outcome's code.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use pipedeploy::config::ClientConfig;
use pipedeploy::error::Result;
use pipedeploy::output::{Output, OutputMode};
use pipedeploy::signal::interrupt_token;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    match run(cli, mode).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            Output::new(mode).error(&e.to_string(), None);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<i32> {
    match cli.command {
        Commands::Deploy(args) => {
            let config = ClientConfig::from_env()?;
            let outcome =
                commands::deploy(&config, args, Output::new(mode), interrupt_token()).await?;
            Ok(outcome.exit_code())
        }
    }
}
