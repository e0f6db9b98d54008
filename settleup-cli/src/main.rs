//! SettleUp CLI - settle shared expenses from bank statements

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{compute, config, files, formats, normalize};

/// SettleUp - who owes what, straight from your statements
#[derive(Parser)]
#[command(name = "settle", version, about, long_about = None)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List statement files in the transactions directory
    Files {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a PDF or CSV statement to the canonical CSV schema
    Normalize {
        /// Statement file (.csv or .pdf)
        file: PathBuf,
        /// Where to write the canonical CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the settlement summary for a person
    Compute {
        /// Statement file (picked interactively when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Person to settle for (empty = everyone)
        #[arg(short, long, env = "SETTLEUP_PERSON")]
        person: Option<String>,
        /// Starting balance date (default: earliest transaction)
        #[arg(long)]
        start: Option<String>,
        /// Date of the last payment (default: latest transaction)
        #[arg(long)]
        paid_on: Option<String>,
        /// Comma-separated export formats: csv,json,md,pdf
        #[arg(long, value_delimiter = ',')]
        export: Vec<String>,
        /// Directory for exported files
        #[arg(long)]
        outdir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which export formats this build supports
    Formats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or edit settings (shows them when no subcommand is given)
    Config {
        #[command(subcommand)]
        command: Option<config::ConfigCommands>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Files { json } => files::run(json),
        Commands::Normalize { file, output, json } => normalize::run(&file, output.as_deref(), json),
        Commands::Compute { file, person, start, paid_on, export, outdir, json } => {
            compute::run(compute::ComputeArgs {
                file,
                person,
                start,
                paid_on,
                export,
                outdir,
                json,
            })
        }
        Commands::Formats { json } => formats::run(json),
        Commands::Config { command } => config::run(command),
    }
}
