//! Structural comparison engine.
//!
//! [`compare`] walks two values in lockstep and records every check it makes
//! as a [`ComparisonNode`] tree. Composite pairs go through a fixed
//! checklist of phases; a failing gate phase stops the remaining phases for
//! that pair only, so siblings elsewhere in the tree are still compared.

use super::frames::FrameRegistry;
use super::model::{
    ComparisonKind, ComparisonNode, DescriptorFlag, KeyLabel, NodeDetail, Path, PathSegment,
    ReasonSet, ReferenceOutcome,
};
use crate::inspect::{DefaultInspector, Inspector};
use crate::value::{
    AttributeKind, AttributeRecord, CollectionEntries, CompositeRef, PropertyKey, Value,
    ValueAdapter,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Fail when common attributes appear in a different order
    pub check_properties_order: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            check_properties_order: true,
        }
    }
}

/// Compare `actual` against `expected` and return the root of the
/// comparison tree.
pub fn compare(
    adapter: &dyn ValueAdapter,
    actual: &Value,
    expected: &Value,
    options: &CompareOptions,
) -> ComparisonNode {
    let mut comparator = Comparator::new(adapter, options.clone());
    comparator.compare_value(ComparisonKind::Identity, None, actual, expected)
}

struct Comparator<'a> {
    adapter: &'a dyn ValueAdapter,
    options: CompareOptions,
    frames: FrameRegistry,
    path: Vec<PathSegment>,
}

impl<'a> Comparator<'a> {
    fn new(adapter: &'a dyn ValueAdapter, options: CompareOptions) -> Self {
        Self {
            adapter,
            options,
            frames: FrameRegistry::new(),
            path: Vec::new(),
        }
    }

    fn current_path(&self) -> Path {
        Path(self.path.clone())
    }

    fn compare_value(
        &mut self,
        kind: ComparisonKind,
        segment: Option<PathSegment>,
        actual: &Value,
        expected: &Value,
    ) -> ComparisonNode {
        let pushed = match &segment {
            Some(s) => {
                self.path.push(s.clone());
                true
            }
            None => false,
        };
        let node = self.compare_at(kind, segment, actual, expected);
        if pushed {
            self.path.pop();
        }
        node
    }

    fn compare_at(
        &mut self,
        kind: ComparisonKind,
        segment: Option<PathSegment>,
        actual: &Value,
        expected: &Value,
    ) -> ComparisonNode {
        let mut node =
            ComparisonNode::new(kind, segment, Some(actual.clone()), Some(expected.clone()));

        // 1. Expectation on the expected side replaces the comparison
        if let Value::Expectation(expectation) = expected {
            node.kind = ComparisonKind::Combinator(expectation.kind());
            if let Err(failure) = expectation.evaluate(self.adapter, actual) {
                node.detail = Some(NodeDetail::Expectation(failure));
                node.fail_modified(expectation.kind().name());
            }
            return node;
        }

        // 2. Anything involving a primitive is an identity check
        let (Some(a), Some(e)) = (actual.as_composite(), expected.as_composite()) else {
            if !actual.same_value(expected) {
                node.fail_modified("value");
            }
            return node;
        };

        // 3. Same reference
        if a == e {
            return node;
        }

        // 4. Well-known composites only equal themselves
        if self.adapter.well_known_path(a).is_some() || self.adapter.well_known_path(e).is_some()
        {
            node.fail_modified("identity");
            return node;
        }

        // 5. Pairs met before resolve against the registry
        if let Some(outcome) = self.frames.lookup(a, e) {
            node.kind = ComparisonKind::Reference;
            if !matches!(outcome, ReferenceOutcome::Consistent { .. }) {
                tracing::debug!(
                    component = module_path!(),
                    path = %self.current_path(),
                    outcome = ?outcome,
                    "reference mismatch"
                );
                node.fail_modified("reference");
            }
            node.detail = Some(NodeDetail::Reference(outcome));
            return node;
        }
        self.frames.register(a, e, self.current_path());

        // 6. Structural phases
        self.compare_composites(&mut node, a, e);
        node
    }

    fn compare_composites(&mut self, node: &mut ComparisonNode, a: CompositeRef, e: CompositeRef) {
        if self.delegation_parent_phase(node, a, e)
            || self.integrity_phase(node, a, e)
            || self.extensibility_phase(node, a, e)
        {
            return;
        }

        let array = self.adapter.shape_of(a).is_array();
        let attrs_a = self.adapter.attributes_of(a);
        let attrs_e = self.adapter.attributes_of(e);
        let (names_a, symbols_a) = partition(&attrs_a);
        let (names_e, symbols_e) = partition(&attrs_e);

        if self.key_set_phase(node, ComparisonKind::AttributeSet, a, e, &names_a, &names_e)
            || self.order_phase(node, ComparisonKind::AttributeOrder, &names_a, &names_e)
        {
            return;
        }
        let string_attrs: Vec<&AttributeRecord> =
            attrs_a.iter().filter(|r| !r.key.is_symbol()).collect();
        if self.attributes_phase(node, &string_attrs, &attrs_e, array) {
            return;
        }

        if self.key_set_phase(node, ComparisonKind::InternalKeys, a, e, &symbols_a, &symbols_e)
            || self.order_phase(node, ComparisonKind::InternalKeys, &symbols_a, &symbols_e)
        {
            return;
        }
        let symbol_attrs: Vec<&AttributeRecord> =
            attrs_a.iter().filter(|r| r.key.is_symbol()).collect();
        if self.attributes_phase(node, &symbol_attrs, &attrs_e, array) {
            return;
        }

        if self.collection_phase(node, a, e) || self.coercion_phase(node, a, e) {
            return;
        }
        self.pattern_source_phase(node, a, e);
    }

    // ----- Gate phases -----

    fn delegation_parent_phase(&mut self, node: &mut ComparisonNode, a: CompositeRef, e: CompositeRef) -> bool {
        let parent_a = self.adapter.delegation_parent_of(a);
        let parent_e = self.adapter.delegation_parent_of(e);
        let child = self.compare_value(
            ComparisonKind::DelegationParent,
            Some(PathSegment::DelegationParent),
            &parent_a,
            &parent_e,
        );
        let failed = child.failed;
        node.push_child(child);
        failed
    }

    fn integrity_phase(&mut self, node: &mut ComparisonNode, a: CompositeRef, e: CompositeRef) -> bool {
        let level_a = self.adapter.integrity_level_of(a);
        let level_e = self.adapter.integrity_level_of(e);
        if level_a == level_e {
            return false;
        }
        let mut child = ComparisonNode::new(
            ComparisonKind::Integrity,
            None,
            Some(Value::from(level_a.label())),
            Some(Value::from(level_e.label())),
        )
        .with_detail(NodeDetail::Integrity {
            actual: level_a,
            expected: level_e,
        });
        child.fail_modified("integrity");
        node.push_child(child);
        true
    }

    fn extensibility_phase(&mut self, node: &mut ComparisonNode, a: CompositeRef, e: CompositeRef) -> bool {
        let ext_a = self.adapter.is_extensible(a);
        let ext_e = self.adapter.is_extensible(e);
        if ext_a == ext_e {
            return false;
        }
        let mut child = ComparisonNode::new(
            ComparisonKind::Extensibility,
            None,
            Some(Value::Bool(ext_a)),
            Some(Value::Bool(ext_e)),
        )
        .with_detail(NodeDetail::Extensibility {
            actual: ext_a,
            expected: ext_e,
        });
        child.fail_modified("extensibility");
        node.push_child(child);
        true
    }

    /// Presence check over non-intrinsic keys of one family (string or
    /// symbol).
    fn key_set_phase(
        &mut self,
        node: &mut ComparisonNode,
        kind: ComparisonKind,
        a: CompositeRef,
        e: CompositeRef,
        keys_a: &[PropertyKey],
        keys_e: &[PropertyKey],
    ) -> bool {
        let set_a: HashSet<&PropertyKey> = keys_a.iter().collect();
        let set_e: HashSet<&PropertyKey> = keys_e.iter().collect();
        let added: Vec<String> = keys_a
            .iter()
            .filter(|k| !set_e.contains(k))
            .map(|k| self.key_display(k))
            .collect();
        let removed: Vec<String> = keys_e
            .iter()
            .filter(|k| !set_a.contains(k))
            .map(|k| self.key_display(k))
            .collect();
        if added.is_empty() && removed.is_empty() {
            return false;
        }
        let mut child = ComparisonNode::new(
            kind,
            None,
            Some(Value::Composite(a)),
            Some(Value::Composite(e)),
        );
        child.fail(ReasonSet {
            added,
            removed,
            modified: Vec::new(),
        });
        node.push_child(child);
        true
    }

    fn order_phase(
        &mut self,
        node: &mut ComparisonNode,
        kind: ComparisonKind,
        keys_a: &[PropertyKey],
        keys_e: &[PropertyKey],
    ) -> bool {
        if !self.options.check_properties_order {
            return false;
        }
        let set_a: HashSet<&PropertyKey> = keys_a.iter().collect();
        let set_e: HashSet<&PropertyKey> = keys_e.iter().collect();
        let order_a: Vec<String> = keys_a
            .iter()
            .filter(|k| set_e.contains(k))
            .map(|k| self.key_display(k))
            .collect();
        let order_e: Vec<String> = keys_e
            .iter()
            .filter(|k| set_a.contains(k))
            .map(|k| self.key_display(k))
            .collect();
        if order_a == order_e {
            return false;
        }
        let mut child = ComparisonNode::new(kind, None, None, None).with_detail(NodeDetail::Order {
            actual: order_a,
            expected: order_e,
        });
        child.fail_modified("order");
        node.push_child(child);
        true
    }

    // ----- Per-attribute phase -----

    /// Compare every attribute present on both sides; true if any failed.
    fn attributes_phase(
        &mut self,
        node: &mut ComparisonNode,
        attrs_a: &[&AttributeRecord],
        attrs_e: &[AttributeRecord],
        array: bool,
    ) -> bool {
        let by_key: HashMap<&PropertyKey, &AttributeRecord> =
            attrs_e.iter().map(|r| (&r.key, r)).collect();
        let mut failed = false;
        for record_a in attrs_a {
            let Some(record_e) = by_key.get(&record_a.key).copied() else {
                continue;
            };
            failed |= self.compare_attribute(node, record_a, record_e, array);
        }
        failed
    }

    fn compare_attribute(
        &mut self,
        node: &mut ComparisonNode,
        record_a: &AttributeRecord,
        record_e: &AttributeRecord,
        array: bool,
    ) -> bool {
        let key = self.key_label(&record_a.key, array);
        let mut failed = false;

        if !(record_a.intrinsic && record_e.intrinsic) {
            let mut flags = vec![
                (DescriptorFlag::Configurable, record_a.configurable, record_e.configurable),
                (DescriptorFlag::Enumerable, record_a.enumerable, record_e.enumerable),
            ];
            if !record_a.is_accessor() && !record_e.is_accessor() {
                flags.push((DescriptorFlag::Writable, record_a.writable, record_e.writable));
            }
            for (flag, flag_a, flag_e) in flags {
                if flag_a != flag_e {
                    node.push_child(descriptor_mismatch(&key, flag, flag_a, flag_e));
                    failed = true;
                }
            }
        }

        match (&record_a.kind, &record_e.kind) {
            (AttributeKind::Data(value_a), AttributeKind::Data(value_e)) => {
                let child = self.compare_value(
                    ComparisonKind::Identity,
                    Some(PathSegment::Attribute(key)),
                    value_a,
                    value_e,
                );
                failed |= child.failed;
                node.push_child(child);
            }
            (
                AttributeKind::Accessor {
                    get: get_a,
                    set: set_a,
                },
                AttributeKind::Accessor {
                    get: get_e,
                    set: set_e,
                },
            ) => {
                let undefined = Value::Undefined;
                let getter = self.compare_value(
                    ComparisonKind::AttributeDescriptor,
                    Some(PathSegment::Getter(key.clone())),
                    get_a.as_ref().unwrap_or(&undefined),
                    get_e.as_ref().unwrap_or(&undefined),
                );
                failed |= getter.failed;
                node.push_child(getter);
                let setter = self.compare_value(
                    ComparisonKind::AttributeDescriptor,
                    Some(PathSegment::Setter(key.clone())),
                    set_a.as_ref().unwrap_or(&undefined),
                    set_e.as_ref().unwrap_or(&undefined),
                );
                failed |= setter.failed;
                node.push_child(setter);

                let resolved_a = get_a.as_ref().and_then(|g| self.adapter.resolve_accessor(g));
                let resolved_e = get_e.as_ref().and_then(|g| self.adapter.resolve_accessor(g));
                if let (Some(value_a), Some(value_e)) = (resolved_a, resolved_e) {
                    let child = self.compare_value(
                        ComparisonKind::Identity,
                        Some(PathSegment::Attribute(key)),
                        &value_a,
                        &value_e,
                    );
                    failed |= child.failed;
                    node.push_child(child);
                }
            }
            _ => {
                node.push_child(descriptor_mismatch(
                    &key,
                    DescriptorFlag::Kind,
                    record_a.is_accessor(),
                    record_e.is_accessor(),
                ));
                failed = true;
            }
        }
        failed
    }

    // ----- Collections, coercion, patterns -----

    fn collection_phase(&mut self, node: &mut ComparisonNode, a: CompositeRef, e: CompositeRef) -> bool {
        let entries_a = self.adapter.collection_entries_of(a);
        let entries_e = self.adapter.collection_entries_of(e);
        let before = node.children.len();
        match (entries_a, entries_e) {
            (Some(CollectionEntries::Unique(values_a)), Some(CollectionEntries::Unique(values_e))) => {
                self.compare_unique_entries(node, &values_a, &values_e);
            }
            (Some(CollectionEntries::Keyed(pairs_a)), Some(CollectionEntries::Keyed(pairs_e))) => {
                self.compare_keyed_entries(node, pairs_a, pairs_e);
            }
            _ => {}
        }
        node.children[before..].iter().any(|c| c.failed)
    }

    fn compare_unique_entries(&mut self, node: &mut ComparisonNode, values_a: &[Value], values_e: &[Value]) {
        for (i, (value_a, value_e)) in values_a.iter().zip(values_e).enumerate() {
            let child = self.compare_value(
                ComparisonKind::CollectionEntry,
                Some(PathSegment::SetEntry(i)),
                value_a,
                value_e,
            );
            node.push_child(child);
        }
        if values_a.len() == values_e.len() {
            return;
        }
        let common = values_a.len().min(values_e.len());
        let extra: Vec<String> = (common..values_a.len().max(values_e.len()))
            .map(|i| i.to_string())
            .collect();
        let (added, removed) = if values_a.len() > values_e.len() {
            (extra, Vec::new())
        } else {
            (Vec::new(), extra)
        };
        let mut child = ComparisonNode::new(
            ComparisonKind::CollectionSize,
            None,
            Some(Value::Number(values_a.len() as f64)),
            Some(Value::Number(values_e.len() as f64)),
        );
        child.fail(ReasonSet {
            added,
            removed,
            modified: Vec::new(),
        });
        node.push_child(child);
    }

    /// Pair actual entries with the first unmatched expected entry whose
    /// key compares equal; leftovers on either side are one-sided entries.
    fn compare_keyed_entries(
        &mut self,
        node: &mut ComparisonNode,
        pairs_a: Vec<(Value, Value)>,
        pairs_e: Vec<(Value, Value)>,
    ) {
        let mut unmatched: Vec<Option<(Value, Value)>> = pairs_e.into_iter().map(Some).collect();
        for (index_a, (key_a, value_a)) in pairs_a.into_iter().enumerate() {
            let found = unmatched.iter().position(|slot| {
                slot.as_ref()
                    .is_some_and(|(key_e, _)| self.keys_match(&key_a, key_e))
            });
            let label = DefaultInspector.inspect(self.adapter, &key_a);
            match found.and_then(|i| unmatched[i].take().map(|pair| (i, pair))) {
                Some((index_e, (_, value_e))) => {
                    let child = self.compare_value(
                        ComparisonKind::CollectionEntry,
                        Some(PathSegment::MapEntry {
                            key: label,
                            actual_index: Some(index_a),
                            expected_index: Some(index_e),
                        }),
                        &value_a,
                        &value_e,
                    );
                    node.push_child(child);
                }
                None => {
                    let mut child = ComparisonNode::new(
                        ComparisonKind::CollectionEntry,
                        Some(PathSegment::MapEntry {
                            key: label.clone(),
                            actual_index: Some(index_a),
                            expected_index: None,
                        }),
                        Some(value_a),
                        None,
                    );
                    child.fail(ReasonSet {
                        added: vec![label],
                        ..ReasonSet::default()
                    });
                    node.push_child(child);
                }
            }
        }
        for (index_e, slot) in unmatched.into_iter().enumerate() {
            let Some((key_e, value_e)) = slot else {
                continue;
            };
            let label = DefaultInspector.inspect(self.adapter, &key_e);
            let mut child = ComparisonNode::new(
                ComparisonKind::CollectionEntry,
                Some(PathSegment::MapEntry {
                    key: label.clone(),
                    actual_index: None,
                    expected_index: Some(index_e),
                }),
                None,
                Some(value_e),
            );
            child.fail(ReasonSet {
                removed: vec![label],
                ..ReasonSet::default()
            });
            node.push_child(child);
        }
    }

    /// Composite keys are matched by a throwaway comparison that leaves no
    /// trace in this comparison's registry.
    fn keys_match(&self, key_a: &Value, key_e: &Value) -> bool {
        match (key_a.as_composite(), key_e.as_composite()) {
            (Some(_), Some(_)) => {
                let mut probe = Comparator::new(self.adapter, self.options.clone());
                !probe
                    .compare_value(ComparisonKind::Identity, None, key_a, key_e)
                    .failed
            }
            _ => key_a.same_value(key_e),
        }
    }

    fn coercion_phase(&mut self, node: &mut ComparisonNode, a: CompositeRef, e: CompositeRef) -> bool {
        let (Some(hook_a), Some(hook_e)) = (
            self.adapter.coercion_hook_of(a),
            self.adapter.coercion_hook_of(e),
        ) else {
            return false;
        };
        let child = self.compare_value(
            ComparisonKind::CoercionResult,
            Some(PathSegment::Coercion),
            &hook_a.invoke(),
            &hook_e.invoke(),
        );
        let failed = child.failed;
        node.push_child(child);
        failed
    }

    fn pattern_source_phase(&mut self, node: &mut ComparisonNode, a: CompositeRef, e: CompositeRef) {
        let (Some(source_a), Some(source_e)) = (
            self.adapter.pattern_source_of(a),
            self.adapter.pattern_source_of(e),
        ) else {
            return;
        };
        let child = self.compare_value(
            ComparisonKind::PatternSource,
            Some(PathSegment::PatternSource),
            &Value::String(source_a),
            &Value::String(source_e),
        );
        node.push_child(child);
    }

    // ----- Helpers -----

    fn key_label(&self, key: &PropertyKey, array: bool) -> KeyLabel {
        match key {
            PropertyKey::Symbol(id) => KeyLabel::Symbol {
                id: *id,
                description: self.adapter.symbol_description(*id).unwrap_or_default(),
            },
            PropertyKey::String(name) => match key.as_index() {
                Some(i) if array => KeyLabel::Index(i),
                _ => KeyLabel::Name(name.clone()),
            },
        }
    }

    fn key_display(&self, key: &PropertyKey) -> String {
        self.key_label(key, false).display()
    }
}

/// Non-intrinsic string keys and symbol keys, in definition order.
fn partition(attributes: &[AttributeRecord]) -> (Vec<PropertyKey>, Vec<PropertyKey>) {
    attributes
        .iter()
        .filter(|r| !r.intrinsic)
        .map(|r| r.key.clone())
        .partition(|k| !k.is_symbol())
}

fn descriptor_mismatch(key: &KeyLabel, flag: DescriptorFlag, actual: bool, expected: bool) -> ComparisonNode {
    let mut child = ComparisonNode::new(
        ComparisonKind::AttributeDescriptor,
        Some(PathSegment::Descriptor {
            key: key.clone(),
            flag,
        }),
        Some(Value::Bool(actual)),
        Some(Value::Bool(expected)),
    )
    .with_detail(NodeDetail::Descriptor {
        flag,
        actual,
        expected,
    });
    child.fail_modified(flag.name());
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expect;
    use crate::value::{Heap, IntegrityLevel};

    fn run(heap: &Heap, actual: &Value, expected: &Value) -> ComparisonNode {
        compare(heap, actual, expected, &CompareOptions::default())
    }

    fn object(heap: &mut Heap, entries: &[(&str, Value)]) -> Value {
        let obj = heap.object();
        for (k, v) in entries {
            heap.define(&obj, *k, v.clone()).unwrap();
        }
        obj
    }

    #[test]
    fn test_primitives() {
        let heap = Heap::new();
        assert!(!run(&heap, &Value::from(1), &Value::from(1)).failed);
        assert!(run(&heap, &Value::from(1), &Value::from("1")).failed);
        assert!(run(&heap, &Value::Number(0.0), &Value::Number(-0.0)).failed);
        assert!(!run(&heap, &Value::Number(f64::NAN), &Value::Number(f64::NAN)).failed);
    }

    #[test]
    fn test_equal_objects_pass() {
        let mut heap = Heap::new();
        let a = object(&mut heap, &[("x", Value::from(1)), ("y", Value::from("s"))]);
        let b = object(&mut heap, &[("x", Value::from(1)), ("y", Value::from("s"))]);
        let root = run(&heap, &a, &b);
        assert!(!root.failed, "{:#?}", root);
    }

    #[test]
    fn test_same_reference_registers_nothing() {
        let mut heap = Heap::new();
        let a = object(&mut heap, &[("x", Value::from(1))]);
        let root = run(&heap, &a, &a);
        assert!(!root.failed);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_missing_attribute_stops_node() {
        let mut heap = Heap::new();
        let a = object(&mut heap, &[("x", Value::from(1))]);
        let b = object(&mut heap, &[("x", Value::from(2)), ("y", Value::from(1))]);
        let root = run(&heap, &a, &b);
        assert!(root.failed);
        let set = root.child_by_kind(ComparisonKind::AttributeSet).unwrap();
        assert_eq!(set.reasons.own.removed, vec!["y"]);
        // the value phase never ran
        assert!(root
            .children
            .iter()
            .all(|c| c.kind != ComparisonKind::Identity));
    }

    #[test]
    fn test_all_siblings_are_compared() {
        let mut heap = Heap::new();
        let a = object(&mut heap, &[("x", Value::from(1)), ("y", Value::from(1))]);
        let b = object(&mut heap, &[("x", Value::from(2)), ("y", Value::from(2))]);
        let root = run(&heap, &a, &b);
        let failing: Vec<String> = root
            .children
            .iter()
            .filter(|c| c.failed)
            .filter_map(|c| c.segment.as_ref().map(|s| s.to_string()))
            .collect();
        assert_eq!(failing, vec![".x", ".y"]);
    }

    #[test]
    fn test_order_check_is_optional() {
        let mut heap = Heap::new();
        let a = object(&mut heap, &[("x", Value::from(1)), ("y", Value::from(1))]);
        let b = object(&mut heap, &[("y", Value::from(1)), ("x", Value::from(1))]);
        let root = run(&heap, &a, &b);
        assert!(root.child_by_kind(ComparisonKind::AttributeOrder).is_some());
        let relaxed = compare(
            &heap,
            &a,
            &b,
            &CompareOptions {
                check_properties_order: false,
            },
        );
        assert!(!relaxed.failed);
    }

    #[test]
    fn test_well_known_compared_by_identity() {
        let heap = Heap::new();
        let realm = *heap.realm();
        let root = run(
            &heap,
            &Value::Composite(realm.array_prototype),
            &Value::Composite(realm.set_prototype),
        );
        assert!(root.self_failed);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_delegation_parent_mismatch() {
        let mut heap = Heap::new();
        let arr = heap.array(Vec::<Value>::new());
        let obj = heap.object();
        let root = run(&heap, &arr, &obj);
        let parent = root.child_by_kind(ComparisonKind::DelegationParent).unwrap();
        assert!(parent.self_failed);
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_self_cycle_terminates() {
        let mut heap = Heap::new();
        let a = heap.object();
        heap.define(&a, "self", a.clone()).unwrap();
        let b = heap.object();
        heap.define(&b, "self", b.clone()).unwrap();
        let root = run(&heap, &a, &b);
        assert!(!root.failed);
        let inner = root
            .children
            .iter()
            .find(|c| c.kind == ComparisonKind::Reference)
            .unwrap();
        assert_eq!(
            inner.reference(),
            Some(&ReferenceOutcome::Consistent {
                target: Path::root()
            })
        );
    }

    #[test]
    fn test_cycle_against_copy_is_missing_reference() {
        let mut heap = Heap::new();
        let a = heap.object();
        let inner = heap.object();
        heap.define(&a, "self", inner).unwrap();
        let b = heap.object();
        heap.define(&b, "self", b.clone()).unwrap();
        let root = run(&heap, &a, &b);
        assert!(root.failed);
    }

    #[test]
    fn test_shared_reference_diverges() {
        let mut heap = Heap::new();
        let shared = object(&mut heap, &[("v", Value::from(1))]);
        let a = object(&mut heap, &[("p", shared.clone()), ("q", shared)]);
        let e1 = object(&mut heap, &[("v", Value::from(1))]);
        let e2 = object(&mut heap, &[("v", Value::from(1))]);
        let b = object(&mut heap, &[("p", e1), ("q", e2)]);
        let root = run(&heap, &a, &b);
        let q = root
            .children
            .iter()
            .find(|c| c.segment.as_ref().map(|s| s.to_string()).as_deref() == Some(".q"))
            .unwrap();
        assert_eq!(q.kind, ComparisonKind::Reference);
        assert!(matches!(
            q.reference(),
            Some(ReferenceOutcome::Unexpected { .. })
        ));
    }

    #[test]
    fn test_integrity_gate() {
        let mut heap = Heap::new();
        let a = object(&mut heap, &[("x", Value::from(1))]);
        let b = object(&mut heap, &[("x", Value::from(2))]);
        heap.freeze(&b).unwrap();
        let root = run(&heap, &a, &b);
        let node = root.child_by_kind(ComparisonKind::Integrity).unwrap();
        assert_eq!(
            node.detail,
            Some(NodeDetail::Integrity {
                actual: IntegrityLevel::None,
                expected: IntegrityLevel::Frozen,
            })
        );
        assert!(root.children.iter().all(|c| c.kind != ComparisonKind::Identity));
    }

    #[test]
    fn test_descriptor_flags() {
        let mut heap = Heap::new();
        let a = heap.object();
        heap.define_attribute(&a, AttributeRecord::data("x", Value::from(1)).enumerable(false))
            .unwrap();
        let b = object(&mut heap, &[("x", Value::from(1))]);
        let root = run(&heap, &a, &b);
        let node = root
            .child_by_kind(ComparisonKind::AttributeDescriptor)
            .unwrap();
        assert_eq!(
            node.detail,
            Some(NodeDetail::Descriptor {
                flag: DescriptorFlag::Enumerable,
                actual: false,
                expected: true,
            })
        );
    }

    #[test]
    fn test_accessor_values_are_compared() {
        let mut heap = Heap::new();
        let get_a = heap.native_function("get", || Value::from(1));
        let get_e = heap.native_function("get", || Value::from(2));
        let a = heap.object();
        heap.define_accessor(&a, "v", Some(get_a), None).unwrap();
        let b = heap.object();
        heap.define_accessor(&b, "v", Some(get_e), None).unwrap();
        let root = run(&heap, &a, &b);
        let value = root
            .children
            .iter()
            .find(|c| c.kind == ComparisonKind::Identity && c.failed)
            .unwrap();
        assert_eq!(value.segment.as_ref().unwrap().to_string(), ".v");
    }

    #[test]
    fn test_set_size_and_entries() {
        let mut heap = Heap::new();
        let a = heap.set([Value::from(1), Value::from(2)]);
        let b = heap.set([Value::from(1)]);
        let root = run(&heap, &a, &b);
        let size = root.child_by_kind(ComparisonKind::CollectionSize).unwrap();
        assert_eq!(size.reasons.own.added, vec!["1"]);
    }

    #[test]
    fn test_map_entries_match_by_key() {
        let mut heap = Heap::new();
        let a = heap.map([
            (Value::from("a"), Value::from(1)),
            (Value::from("b"), Value::from(2)),
        ]);
        let b = heap.map([
            (Value::from("b"), Value::from(2)),
            (Value::from("c"), Value::from(3)),
        ]);
        let root = run(&heap, &a, &b);
        let one_sided: Vec<(bool, bool)> = root
            .children
            .iter()
            .filter(|c| c.kind == ComparisonKind::CollectionEntry && c.failed)
            .map(|c| (c.actual.is_some(), c.expected.is_some()))
            .collect();
        assert_eq!(one_sided, vec![(true, false), (false, true)]);
    }

    #[test]
    fn test_map_composite_keys_match_structurally() {
        let mut heap = Heap::new();
        let key_a = object(&mut heap, &[("id", Value::from(1))]);
        let key_e = object(&mut heap, &[("id", Value::from(1))]);
        let a = heap.map([(key_a, Value::from("x"))]);
        let b = heap.map([(key_e, Value::from("x"))]);
        assert!(!run(&heap, &a, &b).failed);
    }

    #[test]
    fn test_coercion_and_pattern_phases() {
        let mut heap = Heap::new();
        let a = heap.object();
        heap.set_coercion_hook(&a, || Value::from(1)).unwrap();
        let b = heap.object();
        heap.set_coercion_hook(&b, || Value::from(2)).unwrap();
        let root = run(&heap, &a, &b);
        assert!(root.child_by_kind(ComparisonKind::CoercionResult).unwrap().failed);

        let p = heap.pattern("a+", "g");
        let q = heap.pattern("a+", "i");
        let root = run(&heap, &p, &q);
        assert!(root.child_by_kind(ComparisonKind::PatternSource).unwrap().failed);
    }

    #[test]
    fn test_combinator_node() {
        let heap = Heap::new();
        let root = run(&heap, &Value::from(42), &expect::not(42));
        assert_eq!(
            root.kind,
            ComparisonKind::Combinator(crate::expect::CombinatorKind::Not)
        );
        assert!(root.self_failed);
    }

    #[test]
    fn test_failed_invariant_holds_everywhere() {
        fn check(node: &ComparisonNode) {
            let expected = node.self_failed || node.children.iter().any(|c| c.failed);
            assert_eq!(node.failed, expected);
            node.children.iter().for_each(check);
        }
        let mut heap = Heap::new();
        let inner_a = object(&mut heap, &[("z", Value::from(1))]);
        let inner_b = object(&mut heap, &[("z", Value::from(2))]);
        let a = object(&mut heap, &[("x", inner_a), ("y", Value::from(true))]);
        let b = object(&mut heap, &[("x", inner_b), ("y", Value::from(true))]);
        check(&run(&heap, &a, &b));
    }
}
