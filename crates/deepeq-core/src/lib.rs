//! deepeq core - structural value comparison with bounded diffs
//!
//! This crate compares an `actual` value against an `expected` value and,
//! when they differ, explains why:
//! - A value model adapter over an in-memory object heap or borrowed JSON
//! - Expectation combinators (`not`, `any`, `matches_pattern`, `close_to`,
//!   `starts_with`, `between`) usable in expected position
//! - A comparator producing a tree of every check, with a cycle guard
//! - A diff renderer bounded by depth, diff and context budgets
//! - An error message selector that describes the deepest failure
//!
//! ```
//! use deepeq_core::assert_json;
//! use serde_json::json;
//!
//! assert!(assert_json(&json!({"a": [1, 2]}), &json!({"a": [1, 2]})).is_ok());
//!
//! let err = assert_json(&json!({"a": true}), &json!({"a": {"b": true}})).unwrap_err();
//! assert!(err.is_assertion_failure());
//! assert_eq!(err.path(), Some("actual.a"));
//! ```

pub mod assertion;
pub mod compare;
pub mod errors;
pub mod expect;
pub mod inspect;
pub mod logging_facility;
pub mod message;
pub mod options;
pub mod render;
pub mod value;

pub use deepeq_core_types as core_types;

// Re-export commonly used types
pub use assertion::{
    assert, assert_json, assert_json_annotated, assert_json_with, assert_with, AssertOptions,
    AssertOptionsJson,
};
pub use compare::{compare, CompareOptions, ComparisonKind, ComparisonNode};
pub use errors::{AssertionFailure, DeepEqError, ExError, ExErrorKind, Result};
pub use message::select_message;
pub use options::RenderOptions;
pub use render::{render, RenderedDiff};
pub use value::{Heap, JsonAdapter, Value, ValueAdapter};
