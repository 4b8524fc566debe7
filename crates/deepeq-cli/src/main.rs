//! deepeq CLI
//!
//! Command-line interface for comparing JSON documents
//!
//! Exit codes: 0 when the documents are equivalent, 1 when they differ,
//! 2 on usage or IO errors.

use clap::{Parser, Subcommand, ValueEnum};
use deepeq_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "deepeq")]
#[command(about = "deepeq - Structural comparison of JSON documents", long_about = None)]
struct Cli {
    /// Emit operation logs on stderr
    #[arg(long, value_enum, global = true)]
    log: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable, debug level
    Pretty,
    /// JSON lines, info level
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two JSON documents
    Compare(commands::compare::CompareArgs),
    /// Print the effective rendering options as JSON
    Options(commands::options::OptionsArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.log {
        Some(LogFormat::Pretty) => init(Profile::Development),
        Some(LogFormat::Json) => init(Profile::Production),
        None => {}
    }

    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args),
        Commands::Options(args) => commands::options::execute(args),
    };

    let code = match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };
    std::process::exit(code);
}
