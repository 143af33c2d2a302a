mod commands;
mod input;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use commands::business::{EvaluateArgs, SensitivityArgs};
use commands::history::{HistoryArgs, SaveArgs};
use commands::personal::PersonalArgs;

/// Compare two options with structured scoring and business-case metrics
#[derive(Parser)]
#[command(
    name = "dmate",
    version,
    about = "Compare personal and business decisions",
    long_about = "Scores two personal options side by side, or appraises a business case \
                  (CAPEX, OPEX, NPV, IRR, payback, ROI) with a tornado sensitivity, \
                  and keeps a per-user history of saved decisions."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// JSON file holding every user's saved decisions
    #[arg(
        long,
        env = "DECISION_MATE_HISTORY",
        default_value = "history.json",
        global = true
    )]
    history_file: PathBuf,

    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Appraise a business case: NPV, IRR, payback, ROI and tornado
    Evaluate(EvaluateArgs),
    /// One-at-a-time tornado sensitivity of NPV
    Sensitivity(SensitivityArgs),
    /// Score two personal options against shared criteria
    Personal(PersonalArgs),
    /// Evaluate a decision and append it to the user's history
    Save(SaveArgs),
    /// List a user's saved decisions, newest first
    History(HistoryArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::business::run_evaluate(args),
        Commands::Sensitivity(args) => commands::business::run_sensitivity(args),
        Commands::Personal(args) => commands::personal::run_personal(args),
        Commands::Save(args) => commands::history::run_save(args, &cli.history_file),
        Commands::History(args) => commands::history::run_history(args, &cli.history_file),
        Commands::Version => {
            println!("dmate {}", env!("CARGO_PKG_VERSION"));
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
