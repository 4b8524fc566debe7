//! Error message selection.
//!
//! The message describes one failure: the deepest failing node, reached by
//! following the last failing child from the root. Specialized builders are
//! tried in priority order and the first that recognises the node wins;
//! anything unrecognised gets the generic `unequal values` message, which
//! carries the bounded diff of the failing sub-tree.

mod builders;

use crate::compare::model::{ComparisonKind, ComparisonNode, Path};
use crate::inspect::Inspector;
use crate::options::RenderOptions;
use crate::render::annotate::Annotator;
use crate::value::ValueAdapter;

/// Collaborators the builders draw on.
pub struct MessageContext<'a> {
    pub adapter: &'a dyn ValueAdapter,
    pub options: &'a RenderOptions,
    pub inspector: &'a dyn Inspector,
    pub annotator: &'a dyn Annotator,
}

/// The deepest failing node and how it was reached.
#[derive(Debug, Clone)]
pub struct FailureSite<'t> {
    pub node: &'t ComparisonNode,
    /// Nodes from the root down to the failing node's parent
    pub ancestors: Vec<&'t ComparisonNode>,
    pub path: Path,
}

impl<'t> FailureSite<'t> {
    pub fn parent(&self) -> Option<&'t ComparisonNode> {
        self.ancestors.last().copied()
    }
}

/// Selected message with the location it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedMessage {
    pub message: String,
    pub path: Path,
    pub kind: ComparisonKind,
}

/// Follow the last failing child until none is left.
pub fn deepest_failure(root: &ComparisonNode) -> FailureSite<'_> {
    let mut node = root;
    let mut ancestors = Vec::new();
    let mut path = Path::root();
    while let Some(child) = node.children.iter().rev().find(|c| c.failed) {
        if let Some(segment) = &child.segment {
            path = path.child(segment.clone());
        }
        ancestors.push(node);
        node = child;
    }
    FailureSite {
        node,
        ancestors,
        path,
    }
}

/// Build the human message for a failed comparison tree.
pub fn select_message(context: &MessageContext<'_>, root: &ComparisonNode) -> SelectedMessage {
    let site = deepest_failure(root);
    let body = builders::SPECIALIZED
        .iter()
        .find_map(|build| build(context, &site))
        .unwrap_or_else(|| builders::unequal_values(context, &site));
    SelectedMessage {
        message: format!("{}\n{}", body, builders::section("path", &site.path.to_string())),
        path: site.path.clone(),
        kind: site.node.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::engine::{compare, CompareOptions};
    use crate::expect;
    use crate::inspect::DefaultInspector;
    use crate::render::annotate::PlainAnnotator;
    use crate::value::{Heap, Value};
    use serde_json::json;

    fn message_for(heap: &Heap, actual: &Value, expected: &Value) -> SelectedMessage {
        let root = compare(heap, actual, expected, &CompareOptions::default());
        let options = RenderOptions::default();
        let context = MessageContext {
            adapter: heap,
            options: &options,
            inspector: &DefaultInspector,
            annotator: &PlainAnnotator,
        };
        select_message(&context, &root)
    }

    fn json_message(actual: serde_json::Value, expected: serde_json::Value) -> SelectedMessage {
        let mut heap = Heap::new();
        let a = heap.from_json(&actual);
        let e = heap.from_json(&expected);
        message_for(&heap, &a, &e)
    }

    #[test]
    fn test_deepest_failure_follows_last_failing_child() {
        let mut heap = Heap::new();
        let a = heap.from_json(&json!({"x": {"y": 1}, "z": 1}));
        let e = heap.from_json(&json!({"x": {"y": 2}, "z": 1}));
        let root = compare(&heap, &a, &e, &CompareOptions::default());
        let site = deepest_failure(&root);
        assert_eq!(site.path.to_string(), "actual.x.y");
        assert_eq!(site.ancestors.len(), 2);
        assert!(site.parent().is_some());
    }

    #[test]
    fn test_generic_message() {
        let selected = json_message(json!({"a": true}), json!({"a": {"b": true}}));
        assert_eq!(
            selected.message,
            "unequal values\n--- found ---\ntrue\n--- expected ---\n{\n  b: true\n}\n--- path ---\nactual.a"
        );
        assert_eq!(selected.kind, ComparisonKind::Identity);
    }

    #[test]
    fn test_property_wording() {
        let missing = json_message(json!({"a": true}), json!({"a": true, "b": true}));
        assert!(missing.message.starts_with("1 missing property\n"), "{}", missing.message);
        assert!(missing.message.contains("b: true"));

        let unexpected = json_message(json!({"a": true, "b": true, "c": 1}), json!({"a": true}));
        assert!(unexpected.message.starts_with("2 unexpected properties\n"));
    }

    #[test]
    fn test_array_length_wording() {
        let smaller = json_message(json!([1]), json!([1, 2]));
        assert!(smaller.message.starts_with("an array is smaller than expected"));
        assert!(smaller.message.contains("--- missing values ---\n[2]"));
        let bigger = json_message(json!([1, 2, 3]), json!([1]));
        assert!(bigger.message.starts_with("an array is bigger than expected"));
        assert!(bigger.message.contains("--- array length found ---\n3"));
    }

    #[test]
    fn test_string_wording() {
        let heap = Heap::new();
        let selected = message_for(&heap, &Value::from("hello world"), &Value::from("hello france"));
        assert_eq!(
            selected.message,
            "unexpected character in string\n--- details ---\n\"hello world\"\n       ^\nunexpected \"w\", expected to continue with \"france\"\n--- path ---\nactual"
        );
    }

    #[test]
    fn test_string_length_wording() {
        let heap = Heap::new();
        let short = message_for(&heap, &Value::from("abc"), &Value::from("abcd"));
        assert!(short.message.starts_with("string is too short"));
        let long = message_for(&heap, &Value::from("abcd"), &Value::from("abc"));
        assert!(long.message.starts_with("string is too long"));
    }

    #[test]
    fn test_combinator_wording() {
        let heap = Heap::new();
        let not = message_for(&heap, &Value::from(42), &expect::not(42));
        assert_eq!(
            not.message,
            "unexpected value\n--- found ---\n42\n--- expected ---\nan other value\n--- path ---\nactual"
        );
        let between = message_for(&heap, &Value::from(50), &expect::between(100.0, 200.0).unwrap());
        assert!(between
            .message
            .starts_with("50 is too small, it must be between 100 and 200"));
        let big = message_for(&heap, &Value::from(250), &expect::between(100.0, 200.0).unwrap());
        assert!(big.message.starts_with("250 is too big, it must be between 100 and 200"));
    }

    #[test]
    fn test_reference_wording() {
        let mut heap = Heap::new();
        let a = heap.object();
        let inner = heap.object();
        heap.define(&a, "self", inner).unwrap();
        let b = heap.object();
        heap.define(&b, "self", b.clone()).unwrap();
        let selected = message_for(&heap, &a, &b);
        assert!(selected.message.starts_with("missing reference"), "{}", selected.message);
        assert_eq!(selected.path.to_string(), "actual.self");
    }

    #[test]
    fn test_integrity_and_prototype_wording() {
        let mut heap = Heap::new();
        let a = heap.object();
        let e = heap.object();
        heap.freeze(&e).unwrap();
        let selected = message_for(&heap, &a, &e);
        assert!(selected.message.starts_with("unexpected object integrity"));

        let arr = heap.array(Vec::<Value>::new());
        let obj = heap.object();
        let selected = message_for(&heap, &arr, &obj);
        assert!(selected
            .message
            .starts_with("unexpected prototype\n--- prototype found ---\nArray.prototype"));
        assert_eq!(selected.path.to_string(), "actual[[Prototype]]");
    }

    #[test]
    fn test_order_wording() {
        let selected = json_message(json!({"a": 1, "b": 1}), json!({"b": 1, "a": 1}));
        assert_eq!(
            selected.message,
            "unexpected properties order\n--- properties order found ---\n\"a\", \"b\"\n--- properties order expected ---\n\"b\", \"a\"\n--- path ---\nactual"
        );
    }

    #[test]
    fn test_map_entry_wording() {
        let mut heap = Heap::new();
        let a = heap.map([(Value::from("k"), Value::from(1))]);
        let e = heap.map(Vec::<(Value, Value)>::new());
        let selected = message_for(&heap, &a, &e);
        assert!(selected.message.starts_with("1 unexpected entry"), "{}", selected.message);
    }
}
