//! Compare command
//!
//! Usage: deepeq compare <ACTUAL> <EXPECTED> [--options <FILE>] [budget flags]

use super::options::BudgetFlags;
use super::{load_render_options, read_json, Outcome};
use clap::Args;
use deepeq_core::errors::ExError;
use deepeq_core::render::annotate::{Annotator, AnsiAnnotator, PlainAnnotator};
use deepeq_core::{assert_json_annotated, AssertOptionsJson};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// JSON file holding the actual document
    pub actual: PathBuf,

    /// JSON file holding the expected document
    pub expected: PathBuf,

    /// JSON file with rendering options
    #[arg(long)]
    pub options: Option<PathBuf>,

    #[command(flatten)]
    pub budgets: BudgetFlags,

    /// Replace the generated failure message
    #[arg(long)]
    pub message: Option<String>,

    /// Text appended to the failure message
    #[arg(long)]
    pub context: Option<String>,

    /// Also print the full side-by-side diff
    #[arg(long)]
    pub diff: bool,

    /// Color the diff with ANSI escapes
    #[arg(long)]
    pub color: bool,
}

/// Execute compare command
pub fn execute(args: CompareArgs) -> Result<Outcome, ExError> {
    // 1. Load inputs
    let render = load_render_options(args.options.as_deref(), &args.budgets)?;
    let actual = read_json(&args.actual)?;
    let expected = read_json(&args.expected)?;

    // 2. Compare
    let annotator: &dyn Annotator = if args.color {
        &AnsiAnnotator
    } else {
        &PlainAnnotator
    };
    let options = AssertOptionsJson {
        message: args.message,
        context: args.context,
        render,
    };
    let err = match assert_json_annotated(&actual, &expected, options, annotator) {
        Ok(()) => return Ok(Outcome::Equal),
        Err(err) if err.is_assertion_failure() => err,
        Err(err) => return Err(err),
    };

    // 3. Report
    println!("{}", err.message());
    if args.diff {
        if let Some(failure) = err.failure() {
            println!("--- actual ---\n{}", failure.diff.actual);
            println!("--- expected ---\n{}", failure.diff.expected);
        }
    }
    Ok(Outcome::Different)
}
