//! relay CLI - Confluence content extraction.
//!
//! Provides commands for:
//! - `confluence page`: Fetch a page and print its sections
//! - `confluence file`: Extract sections from a local storage-format file
//! - `confluence search`: Run a CQL search

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ConfluenceCommand;
use output::Output;

/// relay - Confluence content extraction.
#[derive(Parser)]
#[command(name = "relay", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover relay.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable info-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Confluence extraction commands.
    #[command(subcommand)]
    Confluence(ConfluenceCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Confluence(cmd) => cmd.execute(cli.config.as_deref()),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
