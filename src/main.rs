use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod check;
mod dedupe;
mod io;
mod mapping;
mod models;
mod pipeline;
mod report;
mod severity;
mod validate;

const DEFAULT_INPUT: &str = "data/data-security-incidents-trends-2023-2024.csv";
const DEFAULT_OUTPUT: &str = "data/data-security-incidents-trends-2023-2024_enhanced.csv";

#[derive(Parser)]
#[command(name = "incident-severity")]
#[command(about = "Severity scoring and preparation for security-incident CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance an incident export with derived metrics and severity scores
    Prepare {
        #[arg(long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Keep only the earliest report per raw incident reference
    Dedupe {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Generate a markdown summary from an enhanced export
    Report {
        #[arg(long, default_value = DEFAULT_OUTPUT)]
        input: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("processing failed: {err:#}");
        return Err(err);
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Prepare { input, output } => {
            let summary = pipeline::prepare(&input, &output)?;
            println!(
                "Enhanced {} rows across {} incidents; output written to {}.",
                summary.rows,
                summary.incidents,
                output.display()
            );
            if summary.inconsistencies > 0 {
                println!(
                    "{} incidents carry inconsistent derived values; see the log.",
                    summary.inconsistencies
                );
            }
        }
        Commands::Dedupe { input, output } => {
            let summary = dedupe::dedupe(&input, &output)?;
            println!(
                "Kept {} unique incidents out of {} rows ({} duplicates removed).",
                summary.unique_rows, summary.original_rows, summary.removed
            );
        }
        Commands::Report { input, out } => {
            report::generate(&input, &out)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
