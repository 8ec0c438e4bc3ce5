use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::collect::CollectArgs;

#[derive(Parser)]
#[command(name = "magpie")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Collect publicly visible posts matching a keyword into a CSV file",
    long_about = "Magpie drives a real browser session: it logs in, runs a keyword search, \
                  scrolls until a target count or the end of the results, deduplicates posts \
                  by identifier, and writes them to a CSV file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect posts matching a keyword and write them to a CSV file
    Collect(CollectArgs),

    /// Report which browser binary a collection run would use
    Doctor {
        /// Path to the browser binary
        #[arg(long)]
        browser_path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute the command
    match cli.command {
        Commands::Collect(args) => commands::collect::execute(args),
        Commands::Doctor { browser_path } => commands::doctor::execute(browser_path),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("magpie=debug,magpie_core=debug,magpie_browser=debug")
    } else {
        EnvFilter::new("magpie=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
