//! Options command
//!
//! Usage: deepeq options [--options <FILE>] [budget flags]

use super::{load_render_options, Outcome};
use clap::Args;
use deepeq_core::errors::{ExError, ExErrorKind};
use deepeq_core::RenderOptions;
use std::path::PathBuf;

/// Budget overrides shared by every command that renders.
#[derive(Debug, Default, Args)]
pub struct BudgetFlags {
    /// Composites nested deeper than this render as `{...}`
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Nesting shown inside a mismatching value
    #[arg(long)]
    pub max_depth_inside_diff: Option<usize>,

    /// Differences shown per composite before summarising
    #[arg(long)]
    pub max_diff_per_composite: Option<usize>,

    /// Unchanged entries shown before each difference
    #[arg(long)]
    pub max_context_before_diff: Option<usize>,

    /// Unchanged entries shown after each difference
    #[arg(long)]
    pub max_context_after_diff: Option<usize>,

    #[arg(long)]
    pub max_columns: Option<usize>,

    #[arg(long)]
    pub max_lines_before_diff: Option<usize>,

    #[arg(long)]
    pub max_lines_after_diff: Option<usize>,

    /// Accept common attributes in any order
    #[arg(long)]
    pub ignore_order: bool,
}

impl BudgetFlags {
    pub fn apply(&self, render: &mut RenderOptions) {
        let pairs = [
            (self.max_depth, &mut render.max_depth),
            (self.max_depth_inside_diff, &mut render.max_depth_inside_diff),
            (self.max_diff_per_composite, &mut render.max_diff_per_composite),
            (self.max_context_before_diff, &mut render.max_context_before_diff),
            (self.max_context_after_diff, &mut render.max_context_after_diff),
            (self.max_columns, &mut render.max_columns),
            (self.max_lines_before_diff, &mut render.max_lines_before_diff),
            (self.max_lines_after_diff, &mut render.max_lines_after_diff),
        ];
        for (flag, field) in pairs {
            if let Some(value) = flag {
                *field = value;
            }
        }
        if self.ignore_order {
            render.check_properties_order = false;
        }
    }
}

#[derive(Debug, Args)]
pub struct OptionsArgs {
    /// JSON file with rendering options
    #[arg(long)]
    pub options: Option<PathBuf>,

    #[command(flatten)]
    pub budgets: BudgetFlags,
}

/// Execute options command
pub fn execute(args: OptionsArgs) -> Result<Outcome, ExError> {
    let render = load_render_options(args.options.as_deref(), &args.budgets)?;
    let text = serde_json::to_string_pretty(&render).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("options")
            .with_message(e.to_string())
    })?;
    println!("{}", text);
    Ok(Outcome::Equal)
}
