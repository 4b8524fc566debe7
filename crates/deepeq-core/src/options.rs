//! Rendering budgets and comparison switches.
//!
//! One flat configuration object. Every field has a default, unknown keys
//! are ignored, and a wrongly typed key is a usage error.

use crate::errors::{DeepEqError, ExError};
use serde::{Deserialize, Serialize};

/// Narrowest accepted `max_columns`.
pub const MIN_COLUMNS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Composites nested deeper than this render as an overview marker
    pub max_depth: usize,
    /// Nesting shown inside a mismatching or one-sided value
    pub max_depth_inside_diff: usize,
    /// Differing entries shown per composite before the rest is summarised
    pub max_diff_per_composite: usize,
    /// Unchanged entries shown before each difference
    pub max_context_before_diff: usize,
    /// Unchanged entries shown after each difference
    pub max_context_after_diff: usize,
    pub max_columns: usize,
    /// Lines of a multi-line string shown before the differing line
    pub max_lines_before_diff: usize,
    pub max_lines_after_diff: usize,
    pub check_properties_order: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_depth_inside_diff: 1,
            max_diff_per_composite: 5,
            max_context_before_diff: 2,
            max_context_after_diff: 2,
            max_columns: 100,
            max_lines_before_diff: 2,
            max_lines_after_diff: 2,
            check_properties_order: true,
        }
    }
}

impl RenderOptions {
    /// Parse options from a JSON object.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` when `json` is not an object, a key has the wrong
    /// type, or a value is out of range.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ExError> {
        if !json.is_object() {
            return Err(DeepEqError::InvalidOption {
                key: "<root>".to_string(),
                reason: format!("expected an object, got {}", json_type(json)),
            }
            .into());
        }
        let options: RenderOptions =
            serde_json::from_value(json.clone()).map_err(|e| DeepEqError::InvalidOption {
                key: offending_key(json).unwrap_or_else(|| "<unknown>".to_string()),
                reason: e.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// # Errors
    ///
    /// `InvalidOptions` when a budget is unusable.
    pub fn validate(&self) -> Result<(), ExError> {
        if self.max_columns < MIN_COLUMNS {
            return Err(DeepEqError::InvalidOption {
                key: "max_columns".to_string(),
                reason: format!("must be at least {}, got {}", MIN_COLUMNS, self.max_columns),
            }
            .into());
        }
        if self.max_diff_per_composite == 0 {
            return Err(DeepEqError::InvalidOption {
                key: "max_diff_per_composite".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn json_type(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// First known key whose value has the wrong JSON type.
fn offending_key(json: &serde_json::Value) -> Option<String> {
    let object = json.as_object()?;
    object
        .iter()
        .find(|(key, value)| match key.as_str() {
            "check_properties_order" => !value.is_boolean(),
            "max_depth"
            | "max_depth_inside_diff"
            | "max_diff_per_composite"
            | "max_context_before_diff"
            | "max_context_after_diff"
            | "max_columns"
            | "max_lines_before_diff"
            | "max_lines_after_diff" => !value.is_u64(),
            _ => false,
        })
        .map(|(key, _)| key.clone())
}
