use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use arbor_core::ArborError;

fn main() {
    let cli = Cli::parse();

    // ARBOR_LOG wins over -v; without either only warnings are shown
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let log_level = std::env::var("ARBOR_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<ArborError>() {
            Some(ArborError::Configuration(_)) => 2,
            Some(ArborError::Io(_)) => 3,
            Some(ArborError::Parse(_)) | Some(ArborError::Serialization(_)) => 4,
            Some(err) if err.is_input_error() => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::cli::commands::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Upgma(args) => crate::cli::commands::upgma::run(args, &config),
        Commands::Distance(args) => crate::cli::commands::distance::run(args, &config),
    }
}
