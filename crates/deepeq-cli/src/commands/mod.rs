pub mod compare;
pub mod options;

use deepeq_core::errors::{ExError, ExErrorKind};
use deepeq_core::RenderOptions;
use std::path::Path;

/// What a command concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Equal,
    Different,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Equal => 0,
            Outcome::Different => 1,
        }
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<serde_json::Value, ExError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("read_json")
            .with_path(path.display().to_string())
            .with_message(e.to_string())
    })?;
    serde_json::from_str(&text).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("read_json")
            .with_path(path.display().to_string())
            .with_message(e.to_string())
    })
}

/// Options file first, then individual flags on top.
pub fn load_render_options(
    file: Option<&Path>,
    overrides: &options::BudgetFlags,
) -> Result<RenderOptions, ExError> {
    let mut render = match file {
        Some(path) => RenderOptions::from_json(&read_json(path)?)?,
        None => RenderOptions::default(),
    };
    overrides.apply(&mut render);
    render.validate()?;
    Ok(render)
}
