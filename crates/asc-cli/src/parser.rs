//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the App Store Connect API runtime.
#[derive(Parser)]
#[command(name = "asc")]
#[command(about = "Talk to the App Store Connect API from scripts and CI")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
