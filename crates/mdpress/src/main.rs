//! mdpress CLI - Markdown to ebook converter.
//!
//! Provides commands for:
//! - `convert`: Convert a directory of markdown documents to PDF/EPUB/MOBI
//! - `clear-cache`: Drop all conversion state, forcing full regeneration

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ClearCacheArgs, ConvertArgs};
use output::Output;

/// mdpress - Markdown to ebook converter.
#[derive(Parser)]
#[command(name = "mdpress", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown documents to the configured output format.
    Convert(ConvertArgs),
    /// Remove all conversion state records.
    ClearCache(ClearCacheArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Convert(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::ClearCache(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
