//! Public `assert` entry point.
//!
//! Builds the comparison tree for one `(actual, expected)` pair and turns a
//! failed tree into an `AssertionFailed` error carrying the selected message,
//! the bounded diff and the failing path.
//!
//! ## Example
//!
//! ```
//! use deepeq_core::assertion::{assert, AssertOptions};
//! use deepeq_core::value::{Heap, Value};
//!
//! let mut heap = Heap::new();
//! let actual = heap.from_json(&serde_json::json!({"a": true}));
//! let expected = heap.from_json(&serde_json::json!({"a": {"b": true}}));
//!
//! let err = assert(&heap, AssertOptions::new(actual, expected)).unwrap_err();
//! assert!(err.is_assertion_failure());
//! assert_eq!(err.path(), Some("actual.a"));
//! ```

use crate::compare::engine::{compare, CompareOptions};
use crate::errors::{AssertionFailure, ExError};
use crate::inspect::{DefaultInspector, Inspector};
use crate::message::{select_message, MessageContext};
use crate::options::RenderOptions;
use crate::render::annotate::{Annotator, PlainAnnotator};
use crate::render::render;
use crate::value::{JsonAdapter, Value, ValueAdapter};
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Arguments of one `assert` call.
#[derive(Debug, Clone)]
pub struct AssertOptions {
    pub actual: Value,
    pub expected: Value,
    /// Replaces the selected message when set
    pub message: Option<String>,
    pub check_properties_order: bool,
    /// Appended verbatim as a trailing `--- context ---` section
    pub context: Option<String>,
    pub render: RenderOptions,
}

impl AssertOptions {
    pub fn new(actual: Value, expected: Value) -> Self {
        Self {
            actual,
            expected,
            message: None,
            check_properties_order: true,
            context: None,
            render: RenderOptions::default(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_properties_order(mut self, check: bool) -> Self {
        self.check_properties_order = check;
        self.render.check_properties_order = check;
        self
    }

    /// Use these budgets; their `check_properties_order` also applies to the
    /// comparison.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.check_properties_order = render.check_properties_order;
        self.render = render;
        self
    }
}

/// Compare `options.actual` against `options.expected`.
///
/// # Errors
///
/// - `AssertionFailed` when the values are not equivalent
/// - `InvalidOptions` when the render budgets are unusable
pub fn assert(adapter: &dyn ValueAdapter, options: AssertOptions) -> Result<(), ExError> {
    assert_with(adapter, options, &DefaultInspector, &PlainAnnotator)
}

/// [`assert`] with explicit inspector and annotator collaborators.
///
/// # Errors
///
/// Same as [`assert`].
pub fn assert_with(
    adapter: &dyn ValueAdapter,
    options: AssertOptions,
    inspector: &dyn Inspector,
    annotator: &dyn Annotator,
) -> Result<(), ExError> {
    let start = Instant::now();
    log_op_start!(
        "assert",
        check_properties_order = options.check_properties_order
    );

    let result = run(adapter, options, inspector, annotator);
    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(node_count) => {
            log_op_end!(
                "assert",
                duration_ms = duration_ms,
                node_count = node_count,
                failed = false
            );
            Ok(())
        }
        Err(err) => {
            log_op_error!(
                "assert",
                err.clone(),
                duration_ms = duration_ms,
                path = err.path().unwrap_or_default()
            );
            Err(err)
        }
    }
}

/// Compare two JSON documents with default options.
///
/// # Errors
///
/// `AssertionFailed` when the documents are not equivalent.
pub fn assert_json(actual: &serde_json::Value, expected: &serde_json::Value) -> Result<(), ExError> {
    assert_json_with(actual, expected, AssertOptionsJson::default())
}

/// Options for [`assert_json_with`]; the values come from the documents.
#[derive(Debug, Clone, Default)]
pub struct AssertOptionsJson {
    pub message: Option<String>,
    pub context: Option<String>,
    pub render: RenderOptions,
}

/// Compare two JSON documents.
///
/// # Errors
///
/// Same as [`assert`].
pub fn assert_json_with(
    actual: &serde_json::Value,
    expected: &serde_json::Value,
    options: AssertOptionsJson,
) -> Result<(), ExError> {
    assert_json_annotated(actual, expected, options, &PlainAnnotator)
}

/// [`assert_json_with`] writing the diff through `annotator`.
///
/// # Errors
///
/// Same as [`assert`].
pub fn assert_json_annotated(
    actual: &serde_json::Value,
    expected: &serde_json::Value,
    options: AssertOptionsJson,
    annotator: &dyn Annotator,
) -> Result<(), ExError> {
    let mut adapter = JsonAdapter::new();
    let actual = adapter.value_of(actual);
    let expected = adapter.value_of(expected);
    let mut assert_options = AssertOptions::new(actual, expected).with_render(options.render);
    assert_options.message = options.message;
    assert_options.context = options.context;
    assert_with(&adapter, assert_options, &DefaultInspector, annotator)
}

/// Returns the node count of a passing comparison.
fn run(
    adapter: &dyn ValueAdapter,
    options: AssertOptions,
    inspector: &dyn Inspector,
    annotator: &dyn Annotator,
) -> Result<usize, ExError> {
    // 1. Reject unusable budgets before comparing
    options.render.validate()?;

    // 2. Build the comparison tree
    let compare_options = CompareOptions {
        check_properties_order: options.check_properties_order,
    };
    let root = compare(adapter, &options.actual, &options.expected, &compare_options);
    if !root.failed {
        return Ok(root.node_count());
    }

    // 3. Describe the failure
    let context = MessageContext {
        adapter,
        options: &options.render,
        inspector,
        annotator,
    };
    let selected = select_message(&context, &root);
    let diff = render(adapter, &root, &options.render, annotator);

    let mut message = options.message.unwrap_or(selected.message);
    if let Some(extra) = options.context {
        message.push_str("\n--- context ---\n");
        message.push_str(&extra);
    }

    tracing::debug!(
        op = "assert",
        path = %selected.path,
        comparison_kind = selected.kind.code(),
        node_count = root.node_count(),
        "comparison failed"
    );

    Err(ExError::assertion_failed(AssertionFailure {
        message,
        diff,
        path: selected.path.to_string(),
        kind: selected.kind,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::model::ComparisonKind;
    use crate::errors::ExErrorKind;
    use crate::expect;
    use crate::render::annotate::AnsiAnnotator;
    use crate::value::Heap;
    use serde_json::json;

    #[test]
    fn test_equal_values_pass() {
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"a": [1, 2, {"b": null}]}));
        let e = heap.from_json(&json!({"a": [1, 2, {"b": null}]}));
        assert!(assert(&heap, AssertOptions::new(a, e)).is_ok());
    }

    #[test]
    fn test_failure_carries_diff_path_and_kind() {
        let err = assert_json(&json!({"a": true}), &json!({"a": {"b": true}})).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::AssertionFailed);
        assert_eq!(err.code(), "ERR_ASSERTION_FAILED");
        let failure = err.failure().unwrap();
        assert_eq!(failure.path, "actual.a");
        assert_eq!(failure.kind, ComparisonKind::Identity);
        assert!(failure.message.starts_with("unequal values\n"));
        assert!(failure.diff.actual.contains("a: true"));
        assert!(failure.diff.expected.contains("b: true"));
        assert_eq!(err.to_string(), failure.message);
    }

    #[test]
    fn test_custom_message_replaces_selected_one() {
        let heap = Heap::new();
        let options = AssertOptions::new(Value::from(1), Value::from(2)).with_message("boom");
        let err = assert(&heap, options).unwrap_err();
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_context_is_appended() {
        let heap = Heap::new();
        let options = AssertOptions::new(Value::from(1), Value::from(2))
            .with_message("boom")
            .with_context("while checking totals");
        let err = assert(&heap, options).unwrap_err();
        assert_eq!(err.message(), "boom\n--- context ---\nwhile checking totals");

        let options =
            AssertOptions::new(Value::from(1), Value::from(2)).with_context("row 3");
        let err = assert(&heap, options).unwrap_err();
        assert!(err.message().starts_with("unequal values"));
        assert!(err.message().ends_with("--- path ---\nactual\n--- context ---\nrow 3"));
    }

    #[test]
    fn test_properties_order_switch() {
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"a": 1, "b": 2}));
        let e = heap.from_json(&json!({"b": 2, "a": 1}));
        assert!(assert(&heap, AssertOptions::new(a.clone(), e.clone())).is_err());
        let relaxed = AssertOptions::new(a, e).with_properties_order(false);
        assert!(assert(&heap, relaxed).is_ok());
    }

    #[test]
    fn test_invalid_render_options_are_usage_errors() {
        let heap = Heap::new();
        let render = RenderOptions {
            max_columns: 3,
            ..RenderOptions::default()
        };
        let err = assert(
            &heap,
            AssertOptions::new(Value::from(1), Value::from(1)).with_render(render),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidOptions);
        assert!(!err.is_assertion_failure());
    }

    #[test]
    fn test_expectation_in_expected_position() {
        let heap = Heap::new();
        let ok = AssertOptions::new(Value::from(150), expect::between(100.0, 200.0).unwrap());
        assert!(assert(&heap, ok).is_ok());
        let failing = AssertOptions::new(Value::from(42), expect::not(42));
        let err = assert(&heap, failing).unwrap_err();
        assert!(err.message().starts_with("unexpected value\n"));
    }

    #[test]
    fn test_annotator_colors_the_diff() {
        let err = assert_json_annotated(
            &json!([1]),
            &json!([2]),
            AssertOptionsJson::default(),
            &AnsiAnnotator,
        )
        .unwrap_err();
        assert!(err.failure().unwrap().diff.actual.contains("\u{1b}["));
    }

    #[test]
    fn test_assert_emits_start_and_end_events() {
        let capture = crate::logging_facility::init_test_capture();
        let heap = Heap::new();
        let options = AssertOptions::new(Value::from("logged"), Value::from("logged"));
        assert!(assert(&heap, options).is_ok());
        capture.assert_event_exists("assert", "start");
        capture.assert_event_exists("assert", "end");
    }
}
