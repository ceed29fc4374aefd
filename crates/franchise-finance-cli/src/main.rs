mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::financing::{EmiArgs, FinancingArgs};
use commands::investment::InvestmentArgs;
use commands::roi::RoiArgs;
use commands::royalty::{RoyaltyArgs, TiersArgs};

/// Franchise royalty, investment and financing calculations
#[derive(Parser)]
#[command(
    name = "ffm",
    version,
    about = "Franchise royalty, investment and financing calculations",
    long_about = "A CLI for franchise fee modelling with decimal precision. Resolves \
                  royalty schedules, simulates royalty and marketing fees, rolls up \
                  initial investment, prices loans and projects ROI."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation steps to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate royalty and marketing fees at a revenue figure
    Royalty(RoyaltyArgs),
    /// Validate a royalty schedule and print its resolved form
    Tiers(TiersArgs),
    /// Roll up an initial investment snapshot
    Investment(InvestmentArgs),
    /// Equated monthly instalment for a loan
    Emi(EmiArgs),
    /// Compare selected financing options against the investment need
    Financing(FinancingArgs),
    /// Project ROI under revenue scenarios
    Roi(RoiArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Royalty(args) => commands::royalty::run_royalty(args),
        Commands::Tiers(args) => commands::royalty::run_tiers(args),
        Commands::Investment(args) => commands::investment::run_investment(args),
        Commands::Emi(args) => commands::financing::run_emi(args),
        Commands::Financing(args) => commands::financing::run_financing(args),
        Commands::Roi(args) => commands::roi::run_roi(args),
        Commands::Version => {
            println!("ffm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
