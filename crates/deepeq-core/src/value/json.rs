//! Read-only adapter over borrowed `serde_json` documents.
//!
//! Objects and arrays are indexed eagerly when a document is registered.
//! Two synthetic intrinsics stand in for `Object.prototype` and
//! `Array.prototype` so the delegation-parent phase tells objects and
//! arrays apart.

use super::{
    AttributeRecord, CoercionHook, CollectionEntries, CompositeRef, Shape, Value, ValueAdapter,
};
use std::collections::HashMap;

const OBJECT_PROTOTYPE: CompositeRef = CompositeRef(0);
const ARRAY_PROTOTYPE: CompositeRef = CompositeRef(1);
const FIRST_NODE: u32 = 2;

#[derive(Debug, Default)]
pub struct JsonAdapter<'a> {
    nodes: Vec<&'a serde_json::Value>,
    index: HashMap<*const serde_json::Value, CompositeRef>,
}

impl<'a> JsonAdapter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document and return the value for its root.
    pub fn value_of(&mut self, json: &'a serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let r = self.register(json);
                for item in items {
                    self.value_of(item);
                }
                Value::Composite(r)
            }
            serde_json::Value::Object(map) => {
                let r = self.register(json);
                for item in map.values() {
                    self.value_of(item);
                }
                Value::Composite(r)
            }
        }
    }

    fn register(&mut self, json: &'a serde_json::Value) -> CompositeRef {
        let key = json as *const serde_json::Value;
        if let Some(r) = self.index.get(&key) {
            return *r;
        }
        let r = CompositeRef(FIRST_NODE + self.nodes.len() as u32);
        self.nodes.push(json);
        self.index.insert(key, r);
        r
    }

    fn node(&self, composite: CompositeRef) -> Option<&'a serde_json::Value> {
        let index = composite.0.checked_sub(FIRST_NODE)? as usize;
        self.nodes.get(index).copied()
    }

    /// Value for an already-registered node.
    fn child_value(&self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => self
                .index
                .get(&(json as *const serde_json::Value))
                .map_or(Value::Undefined, |r| Value::Composite(*r)),
        }
    }
}

impl ValueAdapter for JsonAdapter<'_> {
    fn attributes_of(&self, composite: CompositeRef) -> Vec<AttributeRecord> {
        match self.node(composite) {
            Some(serde_json::Value::Object(map)) => map
                .iter()
                .map(|(k, v)| AttributeRecord::data(k.as_str(), self.child_value(v)))
                .collect(),
            Some(serde_json::Value::Array(items)) => {
                let mut attributes: Vec<AttributeRecord> = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| AttributeRecord::data(i.to_string(), self.child_value(v)))
                    .collect();
                attributes.push(
                    AttributeRecord::data("length", Value::Number(items.len() as f64))
                        .enumerable(false)
                        .configurable(false)
                        .intrinsic(),
                );
                attributes
            }
            _ => Vec::new(),
        }
    }

    fn delegation_parent_of(&self, composite: CompositeRef) -> Value {
        match self.node(composite) {
            Some(serde_json::Value::Object(_)) => Value::Composite(OBJECT_PROTOTYPE),
            Some(serde_json::Value::Array(_)) => Value::Composite(ARRAY_PROTOTYPE),
            _ => Value::Null,
        }
    }

    fn coercion_hook_of(&self, _composite: CompositeRef) -> Option<CoercionHook> {
        None
    }

    fn collection_entries_of(&self, _composite: CompositeRef) -> Option<CollectionEntries> {
        None
    }

    fn is_extensible(&self, _composite: CompositeRef) -> bool {
        true
    }

    fn shape_of(&self, composite: CompositeRef) -> Shape {
        match self.node(composite) {
            Some(serde_json::Value::Array(_)) => Shape::Array,
            _ => Shape::Object { class_name: None },
        }
    }

    fn well_known_path(&self, composite: CompositeRef) -> Option<String> {
        match composite {
            OBJECT_PROTOTYPE => Some("Object.prototype".to_string()),
            ARRAY_PROTOTYPE => Some("Array.prototype".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registers_nested_composites() {
        let doc = json!({"a": {"b": [1, 2]}});
        let mut adapter = JsonAdapter::new();
        let root = adapter.value_of(&doc).as_composite().unwrap();
        let a = adapter.own_value(root, "a").unwrap().as_composite().unwrap();
        let b = adapter.own_value(a, "b").unwrap().as_composite().unwrap();
        assert_eq!(adapter.shape_of(b), Shape::Array);
        assert_eq!(adapter.own_value(b, "length").unwrap().as_number(), Some(2.0));
    }

    #[test]
    fn test_objects_and_arrays_have_distinct_parents() {
        let doc = json!([{}, []]);
        let mut adapter = JsonAdapter::new();
        let root = adapter.value_of(&doc).as_composite().unwrap();
        let obj = adapter.own_value(root, "0").unwrap().as_composite().unwrap();
        let arr = adapter.own_value(root, "1").unwrap().as_composite().unwrap();
        let obj_parent = adapter.delegation_parent_of(obj).as_composite().unwrap();
        let arr_parent = adapter.delegation_parent_of(arr).as_composite().unwrap();
        assert_ne!(obj_parent, arr_parent);
        assert_eq!(
            adapter.well_known_path(arr_parent).as_deref(),
            Some("Array.prototype")
        );
    }

    #[test]
    fn test_separate_documents_get_separate_refs() {
        let left = json!({"a": 1});
        let right = json!({"a": 1});
        let mut adapter = JsonAdapter::new();
        let l = adapter.value_of(&left);
        let r = adapter.value_of(&right);
        assert!(!l.same_value(&r));
    }
}
