//! Single-value pretty printer used by message builders.

use crate::render::text::{key_text, primitive_text, quote, truncate};
use crate::value::{AttributeKind, CollectionEntries, Shape, Value, ValueAdapter};

/// Collaborator that renders one value on one line.
pub trait Inspector {
    fn inspect(&self, adapter: &dyn ValueAdapter, value: &Value) -> String;
}

/// Compact rendering: nested composites down to two levels, five entries
/// per composite, long lines cut at 120 columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInspector;

const MAX_DEPTH: usize = 2;
const MAX_ENTRIES: usize = 5;
const MAX_WIDTH: usize = 120;

impl Inspector for DefaultInspector {
    fn inspect(&self, adapter: &dyn ValueAdapter, value: &Value) -> String {
        truncate(&inspect_at(adapter, value, 0), MAX_WIDTH)
    }
}

fn inspect_at(adapter: &dyn ValueAdapter, value: &Value, depth: usize) -> String {
    if let Some(text) = primitive_text(adapter, value) {
        return text;
    }
    let Some(r) = value.as_composite() else {
        return String::new();
    };
    if let Some(path) = adapter.well_known_path(r) {
        return path;
    }

    let shape = adapter.shape_of(r);
    let (open, close, prefix) = match &shape {
        Shape::Array => ("[", "]", String::new()),
        Shape::Set => ("[", "]", "Set ".to_string()),
        Shape::Map => ("{", "}", "Map ".to_string()),
        Shape::Function { name } => return format!("function {}()", name),
        Shape::Pattern { source, flags } => return format!("/{}/{}", source, flags),
        Shape::Object {
            class_name: Some(name),
        } => ("{", "}", format!("{} ", name)),
        Shape::Object { class_name: None } => ("{", "}", String::new()),
    };
    if depth >= MAX_DEPTH {
        return format!("{}{}...{}", prefix, open, close);
    }

    let mut items: Vec<String> = match adapter.collection_entries_of(r) {
        Some(CollectionEntries::Unique(values)) => values
            .iter()
            .map(|v| inspect_at(adapter, v, depth + 1))
            .collect(),
        Some(CollectionEntries::Keyed(pairs)) => pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{} => {}",
                    inspect_at(adapter, k, depth + 1),
                    inspect_at(adapter, v, depth + 1)
                )
            })
            .collect(),
        None => adapter
            .attributes_of(r)
            .iter()
            .filter(|a| a.enumerable && !a.intrinsic)
            .map(|a| {
                let value = match &a.kind {
                    AttributeKind::Data(v) => inspect_at(adapter, v, depth + 1),
                    AttributeKind::Accessor { .. } => "[accessor]".to_string(),
                };
                if shape.is_array() && a.key.as_index().is_some() {
                    value
                } else {
                    format!("{}: {}", key_text(adapter, &a.key), value)
                }
            })
            .collect(),
    };

    if items.is_empty() {
        return format!("{}{}{}", prefix, open, close);
    }
    if items.len() > MAX_ENTRIES {
        let hidden = items.len() - MAX_ENTRIES;
        items.truncate(MAX_ENTRIES);
        items.push(format!("... {} more", hidden));
    }
    let (pad_open, pad_close) = if open == "{" { ("{ ", " }") } else { (open, close) };
    format!("{}{}{}{}", prefix, pad_open, items.join(", "), pad_close)
}

/// Quoted, comma-separated list for messages (`"a", "b"`).
pub fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote(n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Heap;

    #[test]
    fn test_primitives() {
        let heap = Heap::new();
        assert_eq!(DefaultInspector.inspect(&heap, &Value::from("x")), "\"x\"");
        assert_eq!(DefaultInspector.inspect(&heap, &Value::Number(-0.0)), "-0");
        assert_eq!(DefaultInspector.inspect(&heap, &Value::BigInt(12)), "12n");
    }

    #[test]
    fn test_nested_composites_are_bounded() {
        let mut heap = Heap::new();
        let value = heap.from_json(&serde_json::json!({"a": {"b": {"c": 1}}, "d": [1, 2]}));
        assert_eq!(
            DefaultInspector.inspect(&heap, &value),
            "{ a: { b: {...} }, d: [1, 2] }"
        );
    }

    #[test]
    fn test_cycles_terminate() {
        let mut heap = Heap::new();
        let obj = heap.object();
        heap.define(&obj, "self", obj.clone()).unwrap();
        assert_eq!(
            DefaultInspector.inspect(&heap, &obj),
            "{ self: { self: {...} } }"
        );
    }

    #[test]
    fn test_collections_and_well_known() {
        let mut heap = Heap::new();
        let set = heap.set([Value::from(1)]);
        let map = heap.map([(Value::from("k"), Value::Bool(true))]);
        assert_eq!(DefaultInspector.inspect(&heap, &set), "Set [1]");
        assert_eq!(DefaultInspector.inspect(&heap, &map), "Map { \"k\" => true }");
        let proto = Value::Composite(heap.realm().array_prototype);
        assert_eq!(DefaultInspector.inspect(&heap, &proto), "Array.prototype");
    }

    #[test]
    fn test_entry_limit() {
        let mut heap = Heap::new();
        let arr = heap.array((0..8i32).map(Value::from));
        assert_eq!(
            DefaultInspector.inspect(&heap, &arr),
            "[0, 1, 2, 3, 4, ... 3 more]"
        );
    }
}
