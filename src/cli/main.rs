//! flatfile-bridge command-line interface

mod args;
mod commands;
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use flatfile_bridge::logging::{LogConfig, init_logging};
use flatfile_bridge::{BridgeConfig, Severity, Workflow};

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config =
        LogConfig::from_verbosity(cli.verbose).with_ansi(std::io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    }
    .apply_env()
    .with_overrides(cli.api_url.clone(), None);

    let mut workflow =
        Workflow::from_config(&config).context("Failed to create the API client")?;
    commands::apply_connection(&mut workflow, &cli.connection);

    match &cli.command {
        Command::Tables => commands::handle_tables(&mut workflow).await?,
        Command::Columns(args) => commands::handle_columns(&mut workflow, args).await?,
        Command::Preview(args) => commands::handle_preview(&mut workflow, args).await?,
        Command::Export(args) => commands::handle_export(&mut workflow, args).await?,
        Command::Import(args) => commands::handle_import(&mut workflow, args).await?,
    }

    let status = workflow.status();
    if let Some(line) = output::format_status(status) {
        eprintln!("{}", line);
    }

    Ok(match status.severity() {
        Some(Severity::Error | Severity::Warning) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
