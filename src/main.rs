use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod services;

pub use cli::{Cli, Commands};
use anyhow::Context;
use commands::{handle_admin_commands, handle_runtime_commands};
use domain::models::{InspectReport, JsonOut, MetadataField};
use services::config::{load_settings, ConfigError, Settings};
use services::doctor::run_doctor;
use services::metadata;
use services::output::{print_error, print_one, Reporter};
use services::pipeline::{execute, PipelineError};
use services::runner::SystemRunner;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn error_code(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<ConfigError>().is_some() {
        return "CONFIG_ERROR";
    }
    if let Some(p) = err.downcast_ref::<PipelineError>() {
        return p.code();
    }
    "IO_ERROR"
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if handle_admin_commands(cli)? {
        return Ok(());
    }
    handle_runtime_commands(cli)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            print_error(cli.json, error_code(&e), &format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
