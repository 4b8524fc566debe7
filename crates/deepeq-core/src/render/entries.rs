//! Entry alignment for one composite pair.
//!
//! Both sides of a composite are flattened into one list of entries keyed
//! by attribute, element position or map key. Each entry records where it
//! sits on each side and how the comparison judged it, so the two render
//! trees can apply identical budgets.

use crate::compare::model::{
    ComparisonKind, ComparisonNode, DescriptorFlag, NodeDetail, PathSegment,
};
use crate::value::{
    AttributeKind, AttributeRecord, CollectionEntries, CompositeRef, PropertyKey, Shape, Value,
    ValueAdapter,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub(crate) enum EntryKey {
    Attribute(PropertyKey),
    /// Array index or set position; rendered without a key
    Element,
    MapKey(Value),
    Prototype,
    Coercion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryStatus {
    Same,
    Modified,
    /// Present on both sides at a different relative position
    Moved,
    OnlyActual,
    OnlyExpected,
    /// Belongs to a value whose counterpart has an incompatible layout
    Whole,
}

impl EntryStatus {
    pub(crate) fn is_diff(self) -> bool {
        !matches!(self, EntryStatus::Same)
    }
}

/// An entry's occurrence on one side.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub value: Value,
    pub position: usize,
    /// Accessor attribute without a resolved value
    pub accessor: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Entry<'t> {
    pub key: EntryKey,
    pub actual: Option<Slot>,
    pub expected: Option<Slot>,
    pub node: Option<&'t ComparisonNode>,
    pub status: EntryStatus,
    /// Failed descriptor checks as (flag, actual, expected)
    pub flags: Vec<(DescriptorFlag, bool, bool)>,
}

const PROTOTYPE_POSITION: usize = 0;
const COERCION_POSITION: usize = usize::MAX;

/// True when both shapes lay their entries out the same way.
pub(crate) fn same_layout(a: &Shape, b: &Shape) -> bool {
    matches!(
        (a, b),
        (Shape::Object { .. }, Shape::Object { .. })
            | (Shape::Array, Shape::Array)
            | (Shape::Set, Shape::Set)
            | (Shape::Map, Shape::Map)
            | (Shape::Function { .. }, Shape::Function { .. })
            | (Shape::Pattern { .. }, Shape::Pattern { .. })
    )
}

/// Align the entries of `actual` and `expected`. A side that is `None` (or
/// whose layout differs) contributes nothing, and the other side's entries
/// are all [`EntryStatus::Whole`].
pub(crate) fn align<'t>(
    adapter: &dyn ValueAdapter,
    actual: Option<CompositeRef>,
    expected: Option<CompositeRef>,
    node: Option<&'t ComparisonNode>,
) -> Vec<Entry<'t>> {
    let (actual, expected) = match (actual, expected) {
        (Some(a), Some(e)) if !same_layout(&adapter.shape_of(a), &adapter.shape_of(e)) => {
            // rendered independently; each side only ever reads its own slots
            let mut entries = align(adapter, Some(a), None, None);
            entries.extend(align(adapter, None, Some(e), None));
            return entries;
        }
        pair => pair,
    };
    let Some(reference) = actual.or(expected) else {
        return Vec::new();
    };
    let node = node.filter(|_| actual.is_some() && expected.is_some());

    let mut entries = match adapter.shape_of(reference) {
        Shape::Set => unique_entries(adapter, actual, expected, node),
        Shape::Map => keyed_entries(adapter, actual, expected, node),
        Shape::Function { .. } | Shape::Pattern { .. } => Vec::new(),
        Shape::Array => attribute_entries(adapter, actual, expected, node, true),
        Shape::Object { .. } => attribute_entries(adapter, actual, expected, node, false),
    };
    if let Some(node) = node {
        pseudo_entries(node, &mut entries);
    }
    entries
}

fn visible_attributes(adapter: &dyn ValueAdapter, composite: Option<CompositeRef>) -> Vec<AttributeRecord> {
    composite
        .map(|r| {
            adapter
                .attributes_of(r)
                .into_iter()
                .filter(|a| !a.intrinsic)
                .collect()
        })
        .unwrap_or_default()
}

fn slot_of(record: &AttributeRecord, position: usize) -> Slot {
    match &record.kind {
        AttributeKind::Data(value) => Slot {
            value: value.clone(),
            position,
            accessor: false,
        },
        AttributeKind::Accessor { .. } => Slot {
            value: Value::Undefined,
            position,
            accessor: true,
        },
    }
}

fn segment_key_matches(segment: &Option<PathSegment>, key: &PropertyKey) -> bool {
    match segment {
        Some(PathSegment::Attribute(label))
        | Some(PathSegment::Getter(label))
        | Some(PathSegment::Setter(label))
        | Some(PathSegment::Descriptor { key: label, .. }) => label.matches_key(key),
        _ => false,
    }
}

fn attribute_entries<'t>(
    adapter: &dyn ValueAdapter,
    actual: Option<CompositeRef>,
    expected: Option<CompositeRef>,
    node: Option<&'t ComparisonNode>,
    array: bool,
) -> Vec<Entry<'t>> {
    let whole = actual.is_none() || expected.is_none();
    let attrs_a = visible_attributes(adapter, actual);
    let attrs_e = visible_attributes(adapter, expected);
    let moved: HashSet<PropertyKey> = moved_keys(adapter, node).into_iter().collect();
    let entry_key = |key: &PropertyKey| {
        if array && key.as_index().is_some() {
            EntryKey::Element
        } else {
            EntryKey::Attribute(key.clone())
        }
    };

    let index_e: HashMap<&PropertyKey, usize> = attrs_e
        .iter()
        .enumerate()
        .map(|(j, r)| (&r.key, j))
        .collect();
    let keys_a: HashSet<&PropertyKey> = attrs_a.iter().map(|r| &r.key).collect();

    let mut entries = Vec::new();
    for (i, record_a) in attrs_a.iter().enumerate() {
        let Some(&j) = index_e.get(&record_a.key) else {
            entries.push(Entry {
                key: entry_key(&record_a.key),
                actual: Some(slot_of(record_a, i + 1)),
                expected: None,
                node: None,
                status: if whole {
                    EntryStatus::Whole
                } else {
                    EntryStatus::OnlyActual
                },
                flags: Vec::new(),
            });
            continue;
        };
        let record_e = &attrs_e[j];
        let related: Vec<&'t ComparisonNode> = node
            .map(|n| {
                n.children
                    .iter()
                    .filter(|c| segment_key_matches(&c.segment, &record_a.key))
                    .collect()
            })
            .unwrap_or_default();
        let value_node = related
            .iter()
            .copied()
            .find(|c| matches!(c.segment, Some(PathSegment::Attribute(_))));
        let flags: Vec<(DescriptorFlag, bool, bool)> = related
            .iter()
            .filter_map(|c| match &c.detail {
                Some(NodeDetail::Descriptor {
                    flag,
                    actual,
                    expected,
                }) => Some((*flag, *actual, *expected)),
                _ => None,
            })
            .collect();
        let status = if related.iter().any(|c| c.failed) {
            EntryStatus::Modified
        } else if related.is_empty() && !records_look_equal(record_a, record_e) {
            EntryStatus::Modified
        } else if moved.contains(&record_a.key) {
            EntryStatus::Moved
        } else {
            EntryStatus::Same
        };
        entries.push(Entry {
            key: entry_key(&record_a.key),
            actual: Some(slot_of(record_a, i + 1)),
            expected: Some(slot_of(record_e, j + 1)),
            node: value_node,
            status,
            flags,
        });
    }
    for (j, record_e) in attrs_e.iter().enumerate() {
        if keys_a.contains(&record_e.key) {
            continue;
        }
        entries.push(Entry {
            key: entry_key(&record_e.key),
            actual: None,
            expected: Some(slot_of(record_e, j + 1)),
            node: None,
            status: if whole {
                EntryStatus::Whole
            } else {
                EntryStatus::OnlyExpected
            },
            flags: Vec::new(),
        });
    }
    entries
}

/// Used when the comparison stopped before reaching the attribute.
/// Composites are assumed equal; only primitives are decided here.
fn records_look_equal(a: &AttributeRecord, e: &AttributeRecord) -> bool {
    match (&a.kind, &e.kind) {
        (AttributeKind::Data(va), AttributeKind::Data(ve)) => {
            if va.is_primitive() || ve.is_primitive() {
                va.same_value(ve)
            } else {
                true
            }
        }
        (AttributeKind::Accessor { .. }, AttributeKind::Accessor { .. }) => true,
        _ => false,
    }
}

/// Keys whose rank among the common keys differs between the sides.
fn moved_keys(adapter: &dyn ValueAdapter, node: Option<&ComparisonNode>) -> Vec<PropertyKey> {
    let Some(node) = node else {
        return Vec::new();
    };
    let mut names: Option<HashMap<String, PropertyKey>> = None;
    let mut moved = Vec::new();
    for child in &node.children {
        if !child.failed
            || !matches!(
                child.kind,
                ComparisonKind::AttributeOrder | ComparisonKind::InternalKeys
            )
        {
            continue;
        }
        let Some(NodeDetail::Order { actual, expected }) = &child.detail else {
            continue;
        };
        let names = names.get_or_insert_with(|| display_names(adapter, node));
        for (i, name) in actual.iter().enumerate() {
            if expected.get(i) != Some(name) {
                moved.extend(names.get(name.as_str()).cloned());
            }
        }
    }
    moved
}

/// Order details list keys by display name; map them back to keys of the
/// actual side.
fn display_names(
    adapter: &dyn ValueAdapter,
    node: &ComparisonNode,
) -> HashMap<String, PropertyKey> {
    let Some(composite) = node.actual.as_ref().and_then(|v| v.as_composite()) else {
        return HashMap::new();
    };
    let mut names = HashMap::new();
    for key in adapter.attributes_of(composite).into_iter().map(|r| r.key) {
        match &key {
            PropertyKey::String(s) => {
                names.entry(s.clone()).or_insert(key);
            }
            PropertyKey::Symbol(id) => {
                let description = adapter.symbol_description(*id).unwrap_or_default();
                names
                    .entry(format!("Symbol({})", description))
                    .or_insert_with(|| key.clone());
                names.entry(description).or_insert(key);
            }
        }
    }
    names
}

fn unique_entries<'t>(
    adapter: &dyn ValueAdapter,
    actual: Option<CompositeRef>,
    expected: Option<CompositeRef>,
    node: Option<&'t ComparisonNode>,
) -> Vec<Entry<'t>> {
    let values = |r: Option<CompositeRef>| match r.and_then(|r| adapter.collection_entries_of(r)) {
        Some(CollectionEntries::Unique(values)) => values,
        _ => Vec::new(),
    };
    let whole = actual.is_none() || expected.is_none();
    let values_a = values(actual);
    let values_e = values(expected);
    let slot = |values: &[Value], i: usize| {
        values.get(i).map(|v| Slot {
            value: v.clone(),
            position: i + 1,
            accessor: false,
        })
    };

    (0..values_a.len().max(values_e.len()))
        .map(|i| {
            let child = node.and_then(|n| {
                n.children
                    .iter()
                    .find(|c| c.segment == Some(PathSegment::SetEntry(i)))
            });
            let slot_a = slot(&values_a, i);
            let slot_e = slot(&values_e, i);
            let status = match (&slot_a, &slot_e, child) {
                _ if whole => EntryStatus::Whole,
                (Some(_), None, _) => EntryStatus::OnlyActual,
                (None, _, _) => EntryStatus::OnlyExpected,
                (Some(_), Some(_), Some(c)) if c.failed => EntryStatus::Modified,
                (Some(_), Some(_), Some(_)) => EntryStatus::Same,
                (Some(a), Some(e), None) => loose_status(&a.value, &e.value),
            };
            Entry {
                key: EntryKey::Element,
                actual: slot_a,
                expected: slot_e,
                node: child,
                status,
                flags: Vec::new(),
            }
        })
        .collect()
}

fn loose_status(a: &Value, e: &Value) -> EntryStatus {
    if (a.is_primitive() || e.is_primitive()) && !a.same_value(e) {
        EntryStatus::Modified
    } else {
        EntryStatus::Same
    }
}

fn keyed_entries<'t>(
    adapter: &dyn ValueAdapter,
    actual: Option<CompositeRef>,
    expected: Option<CompositeRef>,
    node: Option<&'t ComparisonNode>,
) -> Vec<Entry<'t>> {
    let pairs = |r: Option<CompositeRef>| match r.and_then(|r| adapter.collection_entries_of(r)) {
        Some(CollectionEntries::Keyed(pairs)) => pairs,
        _ => Vec::new(),
    };
    let whole = actual.is_none() || expected.is_none();
    let pairs_a = pairs(actual);
    let pairs_e = pairs(expected);
    let slot = |pairs: &[(Value, Value)], i: usize| {
        pairs.get(i).map(|(_, v)| Slot {
            value: v.clone(),
            position: i + 1,
            accessor: false,
        })
    };

    // 1. pairing decided by the comparison, when it got this far
    let mut pairing: Vec<(Option<usize>, Option<usize>, Option<&'t ComparisonNode>)> = node
        .map(|n| {
            n.children
                .iter()
                .filter_map(|c| match &c.segment {
                    Some(PathSegment::MapEntry {
                        actual_index,
                        expected_index,
                        ..
                    }) => Some((*actual_index, *expected_index, Some(c))),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    // 2. otherwise pair primitive keys by identity, in actual order
    if pairing.is_empty() {
        let mut taken = vec![false; pairs_e.len()];
        for (i, (key_a, _)) in pairs_a.iter().enumerate() {
            let found = (!whole)
                .then(|| {
                    pairs_e
                        .iter()
                        .enumerate()
                        .position(|(j, (key_e, _))| !taken[j] && key_a.same_value(key_e))
                })
                .flatten();
            if let Some(j) = found {
                taken[j] = true;
            }
            pairing.push((Some(i), found, None));
        }
        for (j, used) in taken.iter().enumerate() {
            if !used {
                pairing.push((None, Some(j), None));
            }
        }
    }

    pairing
        .into_iter()
        .map(|(i, j, child)| {
            let slot_a = i.and_then(|i| slot(&pairs_a, i));
            let slot_e = j.and_then(|j| slot(&pairs_e, j));
            let key = i
                .and_then(|i| pairs_a.get(i))
                .or_else(|| j.and_then(|j| pairs_e.get(j)))
                .map_or(Value::Undefined, |(k, _)| k.clone());
            let status = match (&slot_a, &slot_e, child) {
                _ if whole => EntryStatus::Whole,
                (Some(_), None, _) => EntryStatus::OnlyActual,
                (None, _, _) => EntryStatus::OnlyExpected,
                (Some(_), Some(_), Some(c)) if c.failed => EntryStatus::Modified,
                (Some(_), Some(_), Some(_)) => EntryStatus::Same,
                (Some(a), Some(e), None) => loose_status(&a.value, &e.value),
            };
            Entry {
                key: EntryKey::MapKey(key),
                actual: slot_a,
                expected: slot_e,
                node: child.filter(|c| c.actual.is_some() && c.expected.is_some()),
                status,
                flags: Vec::new(),
            }
        })
        .collect()
}

/// Failed delegation-parent and coercion checks show up as extra entries.
fn pseudo_entries<'t>(node: &'t ComparisonNode, entries: &mut Vec<Entry<'t>>) {
    for child in &node.children {
        if !child.failed {
            continue;
        }
        let (key, position) = match child.kind {
            ComparisonKind::DelegationParent => (EntryKey::Prototype, PROTOTYPE_POSITION),
            ComparisonKind::CoercionResult => (EntryKey::Coercion, COERCION_POSITION),
            _ => continue,
        };
        let slot = |value: &Option<Value>| {
            value.as_ref().map(|v| Slot {
                value: v.clone(),
                position,
                accessor: false,
            })
        };
        entries.push(Entry {
            key,
            actual: slot(&child.actual),
            expected: slot(&child.expected),
            node: Some(child),
            status: EntryStatus::Modified,
            flags: Vec::new(),
        });
    }
}
