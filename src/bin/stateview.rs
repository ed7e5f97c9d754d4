//! Stateview CLI Binary
//!
//! Command-line entry point for rendering state snapshots as output
//! documents.

use anyhow::Context;
use clap::Parser;
use stateview::cli::{self, Cli, Command};
use stateview::config::CliConfig;
use stateview::logging::init_logging;
use stateview::marshal::marshal_state;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    match run(&cli, &config) {
        Ok(output) => {
            info!("command completed");
            println!("{}", output);
        }
        Err(e) => {
            error!("command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Build the effective configuration: file and environment first, then
/// command-line flags on top
fn build_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let mut config =
        CliConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

fn run(cli: &Cli, config: &CliConfig) -> anyhow::Result<String> {
    match &cli.command {
        Command::Show {
            state,
            schemas,
            pretty,
        } => {
            let state = cli::load_state(state)?;
            let schemas = cli::load_schemas(schemas)?;
            let document = marshal_state(&state, &schemas)?;
            let rendered = if *pretty || config.output.pretty {
                document.render_pretty()?
            } else {
                document.render()?
            };
            Ok(rendered)
        }
    }
}
