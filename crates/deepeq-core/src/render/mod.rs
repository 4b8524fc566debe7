//! Diff renderer.
//!
//! A comparison tree is drawn twice, once per side. Each side is a tree of
//! [`RenderNode`]s whose children are aligned with the other side's through
//! [`entries::align`], so both sides pick the same differences, the same
//! context entries and the same collapsed runs. Budgets come from
//! [`RenderOptions`]; nothing outside those budgets limits the output.
//!
//! ```text
//! {
//!   ... 3 unchanged props,
//!   b: true,
//!   c: {...},
//!   ... 12 more props (2 different)
//! }
//! ```

pub mod annotate;
pub(crate) mod entries;
pub mod text;

use crate::compare::model::{ComparisonKind, ComparisonNode, DescriptorFlag, ReferenceOutcome};
use crate::inspect::{DefaultInspector, Inspector};
use crate::options::RenderOptions;
use crate::value::{CompositeRef, IntegrityLevel, Shape, Value, ValueAdapter};
use annotate::{Annotator, Channel};
use entries::{EntryKey, EntryStatus};
use std::cell::OnceCell;
use text::{excerpt, first_difference, key_text, primitive_text, truncate, WindowOptions};

pub use annotate::{AnsiAnnotator, PlainAnnotator};

/// Both sides of a rendered comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiff {
    pub actual: String,
    pub expected: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Actual,
    Expected,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Actual => "actual",
            Side::Expected => "expected",
        }
    }
}

/// Why a render node has no value on its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    None,
    /// The counterpart is a primitive, so no entry can exist here
    StructurallyImpossible,
    /// The entry was added on the other side or removed from this one
    AbsentAddedOrRemoved,
}

/// How a leaf is coloured relative to the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Same,
    Mismatch,
    OnlyHere,
}

/// A located occurrence of a value on one side of the diff.
#[derive(Debug)]
pub struct RenderNode<'t> {
    side: Side,
    value: Option<Value>,
    other: Option<Value>,
    comparison: Option<&'t ComparisonNode>,
    key: Option<EntryKey>,
    /// Failed descriptor flags as seen from this side
    flags: Vec<(DescriptorFlag, bool)>,
    depth: usize,
    /// Levels below the point where a difference was entered
    diff_depth: Option<usize>,
    tone: Tone,
    is_diff: bool,
    placeholder: Placeholder,
    children: OnceCell<Vec<RenderNode<'t>>>,
}

impl<'t> RenderNode<'t> {
    fn root(side: Side, root: &'t ComparisonNode) -> Self {
        let (value, other) = pick(side, root.actual.clone(), root.expected.clone());
        let (tone, diff_depth) = if root.failed {
            (Tone::Mismatch, mismatch_depth(root))
        } else {
            (Tone::Same, None)
        };
        Self {
            side,
            placeholder: if value.is_some() {
                Placeholder::None
            } else {
                Placeholder::StructurallyImpossible
            },
            value,
            other,
            comparison: Some(root),
            key: None,
            flags: Vec::new(),
            depth: 0,
            diff_depth,
            tone,
            is_diff: root.failed,
            children: OnceCell::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Children aligned with the other side, computed on first access.
    /// Entries missing on this side come last, as placeholders.
    pub fn children(&self, adapter: &dyn ValueAdapter, options: &RenderOptions) -> &[RenderNode<'t>] {
        self.children
            .get_or_init(|| self.build_children(adapter, options))
    }

    fn build_children(&self, adapter: &dyn ValueAdapter, options: &RenderOptions) -> Vec<RenderNode<'t>> {
        let mine = self.value.as_ref().and_then(Value::as_composite);
        let theirs = self.other.as_ref().and_then(Value::as_composite);
        if mine.is_none() && theirs.is_none() {
            return Vec::new();
        }
        let comparison = self
            .comparison
            .filter(|c| c.kind != ComparisonKind::Reference);
        let (actual, expected) = pick(self.side, mine, theirs);
        let aligned = entries::align(adapter, actual, expected, comparison);
        let compatible = match (mine, theirs) {
            (Some(m), Some(t)) => entries::same_layout(&adapter.shape_of(m), &adapter.shape_of(t)),
            _ => false,
        };
        let missing_tag = if compatible {
            Placeholder::AbsentAddedOrRemoved
        } else {
            Placeholder::StructurallyImpossible
        };

        let mut present: Vec<(usize, RenderNode<'t>)> = Vec::new();
        let mut absent = Vec::new();
        for entry in aligned {
            let (slot, other_slot) = match self.side {
                Side::Actual => (entry.actual, entry.expected),
                Side::Expected => (entry.expected, entry.actual),
            };
            let flags = entry
                .flags
                .iter()
                .map(|(flag, a, e)| (*flag, if self.side == Side::Actual { *a } else { *e }))
                .collect();
            let Some(slot) = slot else {
                absent.push(RenderNode {
                    side: self.side,
                    value: None,
                    other: other_slot.map(|s| s.value),
                    comparison: None,
                    key: Some(entry.key),
                    flags,
                    depth: self.depth + 1,
                    diff_depth: Some(0),
                    tone: Tone::OnlyHere,
                    is_diff: true,
                    placeholder: missing_tag,
                    children: OnceCell::new(),
                });
                continue;
            };

            let node_values = entry
                .node
                .map(|n| pick(self.side, n.actual.clone(), n.expected.clone()));
            let (value, other) = match node_values {
                Some((Some(v), o)) => (Some(v), o),
                _ => (
                    (!slot.accessor).then(|| slot.value.clone()),
                    other_slot.filter(|s| !s.accessor).map(|s| s.value),
                ),
            };
            let (tone, diff_depth) = self.child_mode(entry.status, entry.node, options);
            present.push((
                slot.position,
                RenderNode {
                    side: self.side,
                    value,
                    other,
                    comparison: entry.node,
                    key: Some(entry.key),
                    flags,
                    depth: self.depth + 1,
                    diff_depth,
                    tone,
                    is_diff: entry.status.is_diff(),
                    placeholder: Placeholder::None,
                    children: OnceCell::new(),
                },
            ));
        }
        present.sort_by_key(|(position, _)| *position);
        present
            .into_iter()
            .map(|(_, node)| node)
            .chain(absent)
            .collect()
    }

    fn child_mode(
        &self,
        status: EntryStatus,
        node: Option<&ComparisonNode>,
        options: &RenderOptions,
    ) -> (Tone, Option<usize>) {
        if let Some(depth) = self.diff_depth {
            return (self.tone, Some(depth + 1));
        }
        match status {
            EntryStatus::Same | EntryStatus::Moved => {
                (Tone::Same, Some(options.max_depth_inside_diff))
            }
            EntryStatus::Modified => (
                Tone::Mismatch,
                node.map_or(Some(0), mismatch_depth),
            ),
            EntryStatus::OnlyActual | EntryStatus::OnlyExpected => (Tone::OnlyHere, Some(0)),
            EntryStatus::Whole => (self.tone, Some(0)),
        }
    }
}

fn pick<T>(side: Side, actual: T, expected: T) -> (T, T) {
    match side {
        Side::Actual => (actual, expected),
        Side::Expected => (expected, actual),
    }
}

/// `None` keeps navigating towards the differences inside a composite
/// pair; `Some(0)` draws the pair as two whole values.
fn mismatch_depth(node: &ComparisonNode) -> Option<usize> {
    let both_composite = matches!(
        (&node.actual, &node.expected),
        (Some(Value::Composite(_)), Some(Value::Composite(_)))
    );
    let structural = both_composite
        && !node.children.is_empty()
        && node.kind != ComparisonKind::Reference
        && !matches!(node.kind, ComparisonKind::Combinator(_));
    if structural {
        None
    } else {
        Some(0)
    }
}

/// Render both sides of `root`.
pub fn render(
    adapter: &dyn ValueAdapter,
    root: &ComparisonNode,
    options: &RenderOptions,
    annotator: &dyn Annotator,
) -> RenderedDiff {
    let renderer = Renderer {
        adapter,
        options,
        annotator,
    };
    let actual = RenderNode::root(Side::Actual, root);
    let expected = RenderNode::root(Side::Expected, root);
    RenderedDiff {
        actual: renderer.lines(&actual, 0).join("\n"),
        expected: renderer.lines(&expected, 0).join("\n"),
    }
}

struct Renderer<'a> {
    adapter: &'a dyn ValueAdapter,
    options: &'a RenderOptions,
    annotator: &'a dyn Annotator,
}

/// What a composite shows of its children.
enum Item {
    Child(usize),
    Unchanged(usize),
    More { count: usize, different: usize },
}

impl<'a> Renderer<'a> {
    fn channel(&self, node: &RenderNode<'_>) -> Channel {
        match (node.tone, node.side) {
            (Tone::Same, _) => Channel::Same,
            (Tone::Mismatch, Side::Actual) => Channel::ActualMismatch,
            (Tone::Mismatch, Side::Expected) => Channel::ExpectedMismatch,
            (Tone::OnlyHere, Side::Actual) => Channel::Added,
            (Tone::OnlyHere, Side::Expected) => Channel::Removed,
        }
    }

    fn structure(&self, text: &str) -> String {
        self.annotator.annotate(text, Channel::Structure)
    }

    /// Lines of `node`; `used` is the width already taken on its first line.
    fn lines(&self, node: &RenderNode<'_>, used: usize) -> Vec<String> {
        let Some(value) = &node.value else {
            return vec![self.annotator.annotate("[accessor]", self.channel(node))];
        };
        if let Some(text) = self.reference_text(node) {
            return vec![self.annotator.annotate(&text, self.channel(node))];
        }
        let Some(r) = value.as_composite() else {
            return vec![self.leaf(node, value, used)];
        };

        let shape = self.adapter.shape_of(r);
        if let Some(path) = self.adapter.well_known_path(r) {
            return vec![self.annotator.annotate(&path, self.channel(node))];
        }
        let overview = node.depth >= self.options.max_depth
            || node
                .diff_depth
                .is_some_and(|d| d >= self.options.max_depth_inside_diff);
        if overview || matches!(shape, Shape::Function { .. } | Shape::Pattern { .. }) {
            let marker = truncate(
                &overview_marker(&shape),
                self.options.max_columns.saturating_sub(used).max(text::MIN_STRING_WIDTH),
            );
            return vec![self.annotator.annotate(&marker, self.channel(node))];
        }
        self.composite(node, r, &shape)
    }

    fn reference_text(&self, node: &RenderNode<'_>) -> Option<String> {
        let comparison = node.comparison?;
        if comparison.kind != ComparisonKind::Reference {
            return None;
        }
        let outcome: &ReferenceOutcome = comparison.reference()?;
        let target = match node.side {
            Side::Actual => outcome.actual_target(),
            Side::Expected => outcome.expected_target(),
        }?;
        let path = target.to_string();
        let suffix = path.strip_prefix("actual").unwrap_or(&path);
        Some(format!("<ref {}{}>", node.side.name(), suffix))
    }

    fn leaf(&self, node: &RenderNode<'_>, value: &Value, used: usize) -> String {
        let width = self
            .options
            .max_columns
            .saturating_sub(used)
            .max(text::MIN_STRING_WIDTH);
        let channel = self.channel(node);
        let Value::String(s) = value else {
            let text = primitive_text(self.adapter, value).unwrap_or_default();
            return self.annotator.annotate(&truncate(&text, width), channel);
        };

        let focus = match (&node.other, node.tone) {
            (Some(Value::String(other)), Tone::Mismatch) => first_difference(s, other),
            _ => None,
        };
        let window = WindowOptions {
            max_width: width,
            lines_before: self.options.max_lines_before_diff,
            lines_after: self.options.max_lines_after_diff,
        };
        let excerpt = excerpt(s, focus, window);
        match excerpt.focus_column {
            Some(column) if focus.is_some() => {
                let head: String = excerpt.text.chars().take(column).collect();
                let tail: String = excerpt.text.chars().skip(column).collect();
                format!(
                    "{}{}",
                    self.annotator.annotate(&head, Channel::Same),
                    self.annotator.annotate(&tail, channel)
                )
            }
            _ => self.annotator.annotate(&excerpt.text, channel),
        }
    }

    fn composite(&self, node: &RenderNode<'_>, r: CompositeRef, shape: &Shape) -> Vec<String> {
        let (open, close) = delimiters(shape);
        let (wrap_open, wrap_close) = self.wrapper(r);
        let head = format!("{}{}{}", wrap_open, class_prefix(shape), open);
        let tail = format!("{}{}", close, wrap_close);
        let wrapper_channel = if node.tone == Tone::Same || wrap_open.is_empty() {
            Channel::Structure
        } else {
            self.channel(node)
        };

        let children = node.children(self.adapter, self.options);
        let present: Vec<&RenderNode<'_>> = children
            .iter()
            .filter(|c| c.placeholder == Placeholder::None)
            .collect();
        if present.is_empty() {
            return vec![self.annotator.annotate(&format!("{}{}", head, tail), wrapper_channel)];
        }

        let items = self.select(node, &present);
        let mut lines = vec![self.annotator.annotate(&head, wrapper_channel)];
        let last = items.len() - 1;
        for (i, item) in items.iter().enumerate() {
            let separator = if i == last { "" } else { "," };
            let mut child_lines = match item {
                Item::Child(index) => {
                    let child = present[*index];
                    let key = self.key_prefix(child);
                    let used = 2 * (node.depth + 1) + key.chars().count();
                    let mut child_lines = self.lines(child, used);
                    if let Some(first) = child_lines.first_mut() {
                        let key = if key.is_empty() {
                            key
                        } else {
                            let key_channel = match child.tone {
                                Tone::OnlyHere => self.channel(child),
                                _ => Channel::Same,
                            };
                            self.annotator.annotate(&key, key_channel)
                        };
                        *first = format!("{}{}", key, first);
                    }
                    child_lines
                }
                Item::Unchanged(count) => vec![self.structure(&format!(
                    "... {} unchanged {}",
                    count,
                    shape.entry_unit(*count)
                ))],
                Item::More { count, different } if *different > 0 => vec![self.structure(
                    &format!(
                        "... {} more {} ({} different)",
                        count,
                        shape.entry_unit(*count),
                        different
                    ),
                )],
                Item::More { count, .. } => vec![self.structure(&format!(
                    "... {} more {}",
                    count,
                    shape.entry_unit(*count)
                ))],
            };
            if let Some(last_line) = child_lines.last_mut() {
                last_line.push_str(separator);
            }
            lines.extend(child_lines.into_iter().map(|l| format!("  {}", l)));
        }
        lines.push(self.annotator.annotate(&tail, wrapper_channel));
        lines
    }

    /// Apply the per-composite budgets to this side's children.
    fn select(&self, node: &RenderNode<'_>, present: &[&RenderNode<'_>]) -> Vec<Item> {
        let total = present.len();
        let budget = self.options.max_diff_per_composite.max(1);

        // inside a difference the value is shown from its start
        if node.diff_depth.is_some() {
            let shown = total.min(budget);
            let mut items: Vec<Item> = (0..shown).map(Item::Child).collect();
            if shown < total {
                items.push(Item::More {
                    count: total - shown,
                    different: 0,
                });
            }
            return items;
        }

        let diffs: Vec<usize> = (0..total).filter(|i| present[*i].is_diff).collect();
        let cutoff = diffs.get(budget).copied().unwrap_or(total);
        let mut visible = vec![false; total];
        if diffs.is_empty() {
            let shown = self.options.max_context_after_diff.max(1).min(total);
            visible[..shown].iter_mut().for_each(|v| *v = true);
        }
        for &d in diffs.iter().take(budget) {
            let from = d.saturating_sub(self.options.max_context_before_diff);
            let to = d
                .saturating_add(self.options.max_context_after_diff)
                .saturating_add(1)
                .min(cutoff);
            visible[from..to].iter_mut().for_each(|v| *v = true);
        }

        let mut items = Vec::new();
        let mut run = 0;
        for (i, shown) in visible.iter().enumerate().take(cutoff) {
            if *shown {
                if run > 0 {
                    items.push(Item::Unchanged(run));
                    run = 0;
                }
                items.push(Item::Child(i));
            } else {
                run += 1;
            }
        }
        if cutoff < total {
            if run > 0 {
                items.push(Item::Unchanged(run));
            }
            items.push(Item::More {
                count: total - cutoff,
                different: diffs.len() - budget.min(diffs.len()),
            });
        } else if run > 0 {
            // a trailing run is folded into the summary line
            items.push(Item::More {
                count: run,
                different: 0,
            });
        }
        items
    }

    fn key_prefix(&self, node: &RenderNode<'_>) -> String {
        let flags = if node.flags.is_empty() {
            String::new()
        } else {
            let listed: Vec<String> = node
                .flags
                .iter()
                .map(|(flag, value)| format!("{}: {}", flag.name(), value))
                .collect();
            format!(" ({})", listed.join(", "))
        };
        match &node.key {
            None | Some(EntryKey::Element) => String::new(),
            Some(EntryKey::Attribute(key)) => {
                format!("{}{}: ", key_text(self.adapter, key), flags)
            }
            Some(EntryKey::MapKey(key)) => {
                format!("{} => ", DefaultInspector.inspect(self.adapter, key))
            }
            Some(EntryKey::Prototype) => "[[Prototype]]: ".to_string(),
            Some(EntryKey::Coercion) => "valueOf(): ".to_string(),
        }
    }

    fn wrapper(&self, r: CompositeRef) -> (&'static str, &'static str) {
        match self.adapter.integrity_level_of(r) {
            IntegrityLevel::Frozen => ("Object.freeze(", ")"),
            IntegrityLevel::Sealed => ("Object.seal(", ")"),
            IntegrityLevel::None if !self.adapter.is_extensible(r) => {
                ("Object.preventExtensions(", ")")
            }
            IntegrityLevel::None => ("", ""),
        }
    }
}

fn delimiters(shape: &Shape) -> (&'static str, &'static str) {
    match shape {
        Shape::Array | Shape::Set => ("[", "]"),
        _ => ("{", "}"),
    }
}

fn class_prefix(shape: &Shape) -> String {
    match shape {
        Shape::Set => "Set ".to_string(),
        Shape::Map => "Map ".to_string(),
        Shape::Object {
            class_name: Some(name),
        } => format!("{} ", name),
        _ => String::new(),
    }
}

/// Collapsed form of a composite that is not expanded.
pub fn overview_marker(shape: &Shape) -> String {
    match shape {
        Shape::Function { name } => format!("function {}()", name),
        Shape::Pattern { source, flags } => format!("/{}/{}", source, flags),
        Shape::Array | Shape::Set => format!("{}[...]", class_prefix(shape)),
        _ => format!("{}{{...}}", class_prefix(shape)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::engine::{compare, CompareOptions};
    use crate::value::Heap;
    use serde_json::json;

    fn diff_with(heap: &Heap, actual: &Value, expected: &Value, options: &RenderOptions) -> RenderedDiff {
        let root = compare(heap, actual, expected, &CompareOptions::default());
        render(heap, &root, options, &PlainAnnotator)
    }

    fn diff_json(actual: serde_json::Value, expected: serde_json::Value) -> RenderedDiff {
        let mut heap = Heap::new();
        let a = heap.from_json(&actual);
        let e = heap.from_json(&expected);
        diff_with(&heap, &a, &e, &RenderOptions::default())
    }

    #[test]
    fn test_primitive_leaves() {
        let diff = diff_json(json!(true), json!(false));
        assert_eq!(diff.actual, "true");
        assert_eq!(diff.expected, "false");
    }

    #[test]
    fn test_nested_mismatch() {
        let diff = diff_json(json!({"a": true}), json!({"a": {"b": true}}));
        assert_eq!(diff.actual, "{\n  a: true\n}");
        assert_eq!(diff.expected, "{\n  a: {\n    b: true\n  }\n}");
    }

    #[test]
    fn test_one_sided_attribute() {
        let diff = diff_json(
            json!({"a": true, "should_not_be_there": true}),
            json!({"a": true}),
        );
        assert_eq!(diff.actual, "{\n  a: true,\n  should_not_be_there: true\n}");
        assert_eq!(diff.expected, "{\n  a: true\n}");
    }

    #[test]
    fn test_unchanged_runs_collapse() {
        let mut actual = serde_json::Map::new();
        let mut expected = serde_json::Map::new();
        for i in 0..10 {
            actual.insert(format!("k{}", i), json!(i));
            expected.insert(format!("k{}", i), json!(if i == 6 { 60 } else { i }));
        }
        let diff = diff_json(actual.into(), expected.into());
        assert_eq!(
            diff.actual,
            "{\n  ... 4 unchanged props,\n  k4: 4,\n  k5: 5,\n  k6: 6,\n  k7: 7,\n  k8: 8,\n  ... 1 more prop\n}"
        );
        assert!(diff.expected.contains("k6: 60"));
    }

    #[test]
    fn test_unbounded_context_after_diff() {
        let options = RenderOptions {
            max_context_after_diff: usize::MAX,
            ..RenderOptions::default()
        };
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"a": 1, "b": 2, "c": 3}));
        let e = heap.from_json(&json!({"a": 1, "b": 20, "c": 3}));
        let diff = diff_with(&heap, &a, &e, &options);
        assert_eq!(diff.actual, "{\n  a: 1,\n  b: 2,\n  c: 3\n}");
    }

    #[test]
    fn test_single_overflow_entry_uses_singular_unit() {
        let options = RenderOptions {
            max_diff_per_composite: 1,
            max_context_before_diff: 0,
            max_context_after_diff: 0,
            ..RenderOptions::default()
        };
        let mut heap = Heap::new();
        let a = heap.from_json(&json!([1, 2]));
        let e = heap.from_json(&json!([10, 20]));
        let diff = diff_with(&heap, &a, &e, &options);
        assert_eq!(diff.actual, "[\n  1,\n  ... 1 more value (1 different)\n]");
    }

    #[test]
    fn test_diff_budget_summarises_the_rest() {
        let actual: Vec<i32> = (0..10).collect();
        let expected: Vec<i32> = (0..10).map(|i| i + 100).collect();
        let options = RenderOptions {
            max_diff_per_composite: 2,
            max_context_before_diff: 0,
            max_context_after_diff: 0,
            ..RenderOptions::default()
        };
        let mut heap = Heap::new();
        let a = heap.from_json(&json!(actual));
        let e = heap.from_json(&json!(expected));
        let diff = diff_with(&heap, &a, &e, &options);
        assert_eq!(diff.actual, "[\n  0,\n  1,\n  ... 8 more values (8 different)\n]");
    }

    #[test]
    fn test_unchanged_composites_use_overview_markers() {
        let diff = diff_json(
            json!({"same": {"deep": [1, 2]}, "x": 1}),
            json!({"same": {"deep": [1, 2]}, "x": 2}),
        );
        assert_eq!(diff.actual, "{\n  same: {...},\n  x: 1\n}");
    }

    #[test]
    fn test_depth_inside_diff() {
        let diff = diff_json(json!({"a": 1}), json!({"a": {"b": {"c": 1}}}));
        assert_eq!(diff.expected, "{\n  a: {\n    b: {...}\n  }\n}");
    }

    #[test]
    fn test_max_depth() {
        let options = RenderOptions {
            max_depth: 1,
            ..RenderOptions::default()
        };
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"a": {"b": 1}}));
        let e = heap.from_json(&json!({"a": {"b": 2}}));
        let diff = diff_with(&heap, &a, &e, &options);
        assert_eq!(diff.actual, "{\n  a: {...}\n}");
    }

    #[test]
    fn test_string_window_keeps_difference_visible() {
        let prefix = "x".repeat(300);
        let options = RenderOptions {
            max_columns: 40,
            ..RenderOptions::default()
        };
        let heap = Heap::new();
        let diff = diff_with(
            &heap,
            &Value::from(format!("{}A", prefix)),
            &Value::from(format!("{}B", prefix)),
            &options,
        );
        assert!(diff.actual.chars().count() <= 40);
        assert!(diff.actual.contains('A'));
        assert!(diff.expected.contains('B'));
    }

    #[test]
    fn test_integrity_wrapper_and_descriptor_suffix() {
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"x": 1}));
        let e = heap.from_json(&json!({"x": 1}));
        heap.freeze(&e).unwrap();
        let diff = diff_with(&heap, &a, &e, &RenderOptions::default());
        assert_eq!(diff.expected, "Object.freeze({\n  x: 1\n})");

        let a = heap.object();
        heap.define_attribute(
            &a,
            crate::value::AttributeRecord::data("x", Value::from(1)).enumerable(false),
        )
        .unwrap();
        let e = heap.from_json(&json!({"x": 1}));
        let diff = diff_with(&heap, &a, &e, &RenderOptions::default());
        assert_eq!(diff.actual, "{\n  x (enumerable: false): 1\n}");
        assert_eq!(diff.expected, "{\n  x (enumerable: true): 1\n}");
    }

    #[test]
    fn test_cycles_render_as_references() {
        let mut heap = Heap::new();
        let a = heap.object();
        heap.define(&a, "self", a.clone()).unwrap();
        heap.define(&a, "v", Value::from(1)).unwrap();
        let e = heap.object();
        heap.define(&e, "self", e.clone()).unwrap();
        heap.define(&e, "v", Value::from(2)).unwrap();
        let diff = diff_with(&heap, &a, &e, &RenderOptions::default());
        assert_eq!(diff.actual, "{\n  self: <ref actual>,\n  v: 1\n}");
        assert_eq!(diff.expected, "{\n  self: <ref expected>,\n  v: 2\n}");
    }

    #[test]
    fn test_collections() {
        let mut heap = Heap::new();
        let a = heap.set([Value::from(1), Value::from(2)]);
        let e = heap.set([Value::from(1)]);
        let diff = diff_with(&heap, &a, &e, &RenderOptions::default());
        assert_eq!(diff.actual, "Set [\n  1,\n  2\n]");
        assert_eq!(diff.expected, "Set [\n  1\n]");

        let a = heap.map([(Value::from("k"), Value::from(1))]);
        let e = heap.map([(Value::from("k"), Value::from(2))]);
        let diff = diff_with(&heap, &a, &e, &RenderOptions::default());
        assert_eq!(diff.actual, "Map {\n  \"k\" => 1\n}");
    }

    #[test]
    fn test_placeholders_mirror_the_other_side() {
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"a": 1, "extra": 2}));
        let e = heap.from_json(&json!({"a": 1}));
        let root = compare(&heap, &a, &e, &CompareOptions::default());
        let options = RenderOptions::default();
        let expected_side = RenderNode::root(Side::Expected, &root);
        let children = expected_side.children(&heap, &options);
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].placeholder(), Placeholder::AbsentAddedOrRemoved);

        let a = Value::Bool(true);
        let e = heap.from_json(&json!({"b": true}));
        let root = compare(&heap, &a, &e, &CompareOptions::default());
        let actual_side = RenderNode::root(Side::Actual, &root);
        let children = actual_side.children(&heap, &options);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].placeholder(), Placeholder::StructurallyImpossible);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"a": [1, 2, {"b": "x"}], "c": "hello"}));
        let e = heap.from_json(&json!({"a": [1, 3, {"b": "y"}], "c": "help"}));
        let root = compare(&heap, &a, &e, &CompareOptions::default());
        let options = RenderOptions::default();
        let first = render(&heap, &root, &options, &PlainAnnotator);
        let second = render(&heap, &root, &options, &PlainAnnotator);
        assert_eq!(first, second);
    }

    #[test]
    fn test_annotations_follow_channels() {
        let heap = Heap::new();
        let root = compare(&heap, &Value::from(1), &Value::from(2), &CompareOptions::default());
        let diff = render(&heap, &root, &RenderOptions::default(), &AnsiAnnotator);
        assert_eq!(diff.actual, "\u{1b}[31m1\u{1b}[0m");
        assert_eq!(diff.expected, "\u{1b}[32m2\u{1b}[0m");
    }
}
