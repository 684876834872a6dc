//! reflint CLI
//!
//! Finds markdown reference links (`[name]`, `[name][]`, `[text][name]`)
//! that have no definition line and appends one for each.

use anyhow::Result;
use clap::{Parser, Subcommand};
use reflint::check::{run_check, CheckArgs};
use reflint::fix::{run_fix, FixArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reflint")]
#[command(author = "RoyalBit Inc.")]
#[command(version)]
#[command(about = "Append missing reference-link definitions to markdown")]
#[command(long_about = "Finds reference links without a definition line and appends one, resolved from reflint.yaml or the npm registry.\n\nCommands:\n  check    List missing reference links\n  fix      Append missing definitions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List reference links that have no definition
    Check(CheckArgs),
    /// Look up missing reference links and append their definitions
    Fix(FixArgs),
}

/// Diagnostics go to stderr, filtered by RUST_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => run_check(args).await,
        Commands::Fix(args) => run_fix(args).await,
    }
}
