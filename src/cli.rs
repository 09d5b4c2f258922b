use crate::domain::constants::DEFAULT_CONFIG_PATH;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "scriptsign",
    version,
    about = "Batch-sign scripts and publish a metadata registry"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_CONFIG_PATH,
        help = "Settings document (YAML)"
    )]
    pub config: PathBuf,
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase diagnostic logging (-v info, -vv debug)"
    )]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign every script and write the registry
    Sign {
        #[arg(long, help = "Regenerate the signing key for every script")]
        force_overwrite: bool,
        #[arg(long, help = "Worker count (overrides `jobs` in settings)")]
        jobs: Option<usize>,
    },
    /// Print the metadata fields found in one script
    Inspect { script: PathBuf },
    /// Check configuration, directories and the signing tool
    Doctor,
    /// Print the effective configuration
    Config,
}
