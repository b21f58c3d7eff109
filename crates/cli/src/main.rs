//! Main entry point for the fxjefe-pipeline binary.
//!
//! Exit codes: 0 when no executed stage FAILED, 1 on any stage failure or
//! on a configuration / selection error (in which case nothing runs).

mod cli;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use fxp_core::config::load_run_config;
use fxp_core::engine::PipelineRunner;
use fxp_core::stages::StageRegistry;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn list_steps() {
    println!("Available pipeline steps (executed in this order):");
    for binding in StageRegistry::new().bindings() {
        println!("  {}. {}", binding.stage.index(), binding.stage);
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.list_steps {
        list_steps();
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(cli.log_level());

    let config = match load_run_config(cli.config.as_deref(), cli.overrides()).await {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return Ok(ExitCode::FAILURE);
        }
    };

    let summary = match PipelineRunner::from_config(&config).run(&config).await {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            eprintln!("Use --list-steps to see available steps.");
            return Ok(ExitCode::FAILURE);
        }
    };

    print!("{}", summary.render());

    if summary.has_failures() {
        println!("{}", "Pipeline finished with errors.".red().bold());
        Ok(ExitCode::FAILURE)
    } else {
        println!("{}", "Pipeline finished successfully.".green().bold());
        Ok(ExitCode::SUCCESS)
    }
}
