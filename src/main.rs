//! Tripflow - Main Entry Point
//!
//! Monthly trip-record pipeline with validation gates and PSI drift scoring.

use clap::Parser;
use colored::Colorize;
use tripflow::cli::{cmd_drift, cmd_ingest, cmd_run, cmd_train, Cli, Commands};
use tripflow::error::PipelineError;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripflow=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = dispatch(cli) {
        eprintln!("{} {err:#}", "error:".red().bold());
        let code = err
            .downcast_ref::<PipelineError>()
            .map(PipelineError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            year,
            month,
            ref_year,
            ref_month,
        } => cmd_run(year, month, ref_year, ref_month),
        Commands::Ingest { input, output } => cmd_ingest(&input, &output),
        Commands::Train { data, model_out } => cmd_train(&data, &model_out),
        Commands::Drift {
            reference,
            current,
            out,
        } => cmd_drift(&reference, &current, &out),
    }
}
