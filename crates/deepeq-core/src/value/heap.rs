//! Arena runtime: a small object heap with prototypes, descriptors,
//! integrity levels, collections, patterns and coercion hooks.
//!
//! Composites are addressed by [`CompositeRef`] indices into one `Vec`.
//! Nothing is ever freed; a heap lives as long as the assertions that use
//! it. Cycles are plain back-references and need no special handling.

use super::well_known::{self, WellKnownSymbol, FIRST_USER_SYMBOL};
use super::{
    AttributeKind, AttributeRecord, CoercionHook, CollectionEntries, CompositeRef, NativeFn,
    PropertyKey, Shape, SymbolId, Value, ValueAdapter,
};
use crate::errors::{DeepEqError, Result};
use std::cell::OnceCell;
use std::collections::{HashMap, VecDeque};

/// Depth of the global-object walk that discovers well-known composites.
const WELL_KNOWN_DEPTH: usize = 2;

#[derive(Debug, Clone)]
enum ObjectKind {
    Ordinary,
    Array,
    Function {
        name: String,
        body: Option<NativeFn>,
    },
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Pattern {
        source: String,
        flags: String,
    },
}

#[derive(Debug, Clone)]
struct HeapObject {
    parent: Value,
    attributes: Vec<AttributeRecord>,
    extensible: bool,
    kind: ObjectKind,
    coercion: Option<CoercionHook>,
}

/// Intrinsic composites created with every heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct Realm {
    pub global: CompositeRef,
    pub object_prototype: CompositeRef,
    pub object_constructor: CompositeRef,
    pub function_prototype: CompositeRef,
    pub function_constructor: CompositeRef,
    pub array_prototype: CompositeRef,
    pub array_constructor: CompositeRef,
    pub set_prototype: CompositeRef,
    pub set_constructor: CompositeRef,
    pub map_prototype: CompositeRef,
    pub map_constructor: CompositeRef,
    pub regexp_prototype: CompositeRef,
    pub regexp_constructor: CompositeRef,
    pub symbol_constructor: CompositeRef,
}

/// Arena of composites plus the realm's intrinsics.
#[derive(Debug)]
pub struct Heap {
    objects: Vec<HeapObject>,
    symbols: Vec<Option<String>>,
    realm: Realm,
    well_known: OnceCell<HashMap<CompositeRef, String>>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn new() -> Self {
        let mut heap = Self {
            objects: Vec::new(),
            symbols: Vec::new(),
            realm: Realm::default(),
            well_known: OnceCell::new(),
        };
        heap.realm = heap.bootstrap();
        heap
    }

    fn bootstrap(&mut self) -> Realm {
        let object_prototype = self.alloc(ObjectKind::Ordinary, Value::Null);
        let function_prototype = self.alloc(
            ObjectKind::Function {
                name: String::new(),
                body: None,
            },
            Value::Composite(object_prototype),
        );
        let mut realm = Realm {
            object_prototype,
            function_prototype,
            ..Realm::default()
        };
        let proto = Value::Composite(object_prototype);

        realm.array_prototype = self.alloc(ObjectKind::Ordinary, proto.clone());
        realm.set_prototype = self.alloc(ObjectKind::Ordinary, proto.clone());
        realm.map_prototype = self.alloc(ObjectKind::Ordinary, proto.clone());
        realm.regexp_prototype = self.alloc(ObjectKind::Ordinary, proto.clone());

        realm.object_constructor = self.alloc_constructor(&realm, "Object", object_prototype);
        realm.function_constructor =
            self.alloc_constructor(&realm, "Function", function_prototype);
        realm.array_constructor = self.alloc_constructor(&realm, "Array", realm.array_prototype);
        realm.set_constructor = self.alloc_constructor(&realm, "Set", realm.set_prototype);
        realm.map_constructor = self.alloc_constructor(&realm, "Map", realm.map_prototype);
        realm.regexp_constructor =
            self.alloc_constructor(&realm, "RegExp", realm.regexp_prototype);

        realm.symbol_constructor = self.alloc_function(&realm, "Symbol", None);
        for sym in WellKnownSymbol::ALL {
            self.objects[realm.symbol_constructor.index()]
                .attributes
                .push(frozen_attribute(sym.name(), Value::Symbol(sym.id())));
        }

        realm.global = self.alloc(ObjectKind::Ordinary, proto);
        for (name, ctor) in [
            ("Object", realm.object_constructor),
            ("Function", realm.function_constructor),
            ("Array", realm.array_constructor),
            ("Set", realm.set_constructor),
            ("Map", realm.map_constructor),
            ("RegExp", realm.regexp_constructor),
            ("Symbol", realm.symbol_constructor),
        ] {
            self.objects[realm.global.index()].attributes.push(
                AttributeRecord::data(name, Value::Composite(ctor)).enumerable(false),
            );
        }
        realm
    }

    fn alloc(&mut self, kind: ObjectKind, parent: Value) -> CompositeRef {
        let r = CompositeRef(self.objects.len() as u32);
        self.objects.push(HeapObject {
            parent,
            attributes: Vec::new(),
            extensible: true,
            kind,
            coercion: None,
        });
        r
    }

    fn alloc_function(&mut self, realm: &Realm, name: &str, body: Option<NativeFn>) -> CompositeRef {
        let r = self.alloc(
            ObjectKind::Function {
                name: name.to_string(),
                body,
            },
            Value::Composite(realm.function_prototype),
        );
        let attributes = &mut self.objects[r.index()].attributes;
        attributes.push(function_intrinsic("length", Value::Number(0.0)));
        attributes.push(function_intrinsic("name", Value::String(name.to_string())));
        r
    }

    fn alloc_constructor(&mut self, realm: &Realm, name: &str, prototype: CompositeRef) -> CompositeRef {
        let ctor = self.alloc_function(realm, name, None);
        self.objects[ctor.index()].attributes.push(
            AttributeRecord::data("prototype", Value::Composite(prototype))
                .enumerable(false)
                .configurable(false)
                .intrinsic(),
        );
        self.objects[prototype.index()].attributes.push(
            AttributeRecord::data("constructor", Value::Composite(ctor)).enumerable(false),
        );
        ctor
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// Number of live composites, intrinsics included.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // ----- Construction -----

    /// Plain object delegating to `Object.prototype`.
    pub fn object(&mut self) -> Value {
        let proto = Value::Composite(self.realm.object_prototype);
        Value::Composite(self.alloc(ObjectKind::Ordinary, proto))
    }

    /// Object with an explicit delegation parent (`Value::Null` allowed).
    pub fn object_with_parent(&mut self, parent: Value) -> Result<Value> {
        check_parent(&parent, "object_with_parent")?;
        Ok(Value::Composite(self.alloc(ObjectKind::Ordinary, parent)))
    }

    pub fn array(&mut self, values: impl IntoIterator<Item = Value>) -> Value {
        let proto = Value::Composite(self.realm.array_prototype);
        let r = self.alloc(ObjectKind::Array, proto);
        let attributes = &mut self.objects[r.index()].attributes;
        for (i, value) in values.into_iter().enumerate() {
            attributes.push(AttributeRecord::data(i.to_string(), value));
        }
        let length = attributes.len() as f64;
        attributes.push(array_length(length));
        Value::Composite(r)
    }

    pub fn function(&mut self, name: &str) -> Value {
        let realm = self.realm;
        Value::Composite(self.alloc_function(&realm, name, None))
    }

    /// Function with a body; usable as a getter.
    pub fn native_function(&mut self, name: &str, body: impl Fn() -> Value + 'static) -> Value {
        let realm = self.realm;
        Value::Composite(self.alloc_function(&realm, name, Some(NativeFn::new(body))))
    }

    /// Constructor with its own fresh prototype object.
    pub fn class(&mut self, name: &str) -> Value {
        let realm = self.realm;
        let prototype = self.alloc(
            ObjectKind::Ordinary,
            Value::Composite(realm.object_prototype),
        );
        Value::Composite(self.alloc_constructor(&realm, name, prototype))
    }

    /// Instance of `constructor`, delegating to its `prototype` attribute.
    pub fn instance(&mut self, constructor: &Value) -> Result<Value> {
        let ctor = self.composite(constructor, "instance")?;
        let prototype = self
            .own_value(ctor, "prototype")
            .filter(|v| v.as_composite().is_some())
            .ok_or_else(|| DeepEqError::InvalidConstructor {
                found: format!("function without prototype ({})", self.describe(constructor)),
            })?;
        Ok(Value::Composite(self.alloc(ObjectKind::Ordinary, prototype)))
    }

    pub fn set(&mut self, values: impl IntoIterator<Item = Value>) -> Value {
        let proto = Value::Composite(self.realm.set_prototype);
        let mut unique: Vec<Value> = Vec::new();
        for value in values {
            if !unique.iter().any(|v| v.same_value(&value)) {
                unique.push(value);
            }
        }
        Value::Composite(self.alloc(ObjectKind::Set(unique), proto))
    }

    pub fn map(&mut self, entries: impl IntoIterator<Item = (Value, Value)>) -> Value {
        let proto = Value::Composite(self.realm.map_prototype);
        let r = self.alloc(ObjectKind::Map(Vec::new()), proto);
        for (key, value) in entries {
            self.upsert_map_entry(r, key, value);
        }
        Value::Composite(r)
    }

    pub fn pattern(&mut self, source: &str, flags: &str) -> Value {
        let proto = Value::Composite(self.realm.regexp_prototype);
        let r = self.alloc(
            ObjectKind::Pattern {
                source: source.to_string(),
                flags: flags.to_string(),
            },
            proto,
        );
        self.objects[r.index()].attributes.push(
            AttributeRecord::data("lastIndex", Value::Number(0.0))
                .enumerable(false)
                .configurable(false)
                .intrinsic(),
        );
        Value::Composite(r)
    }

    /// Fresh unique symbol.
    pub fn symbol(&mut self, description: Option<&str>) -> Value {
        let id = SymbolId(FIRST_USER_SYMBOL + self.symbols.len() as u32);
        self.symbols.push(description.map(str::to_string));
        Value::Symbol(id)
    }

    /// Build heap values mirroring a JSON document.
    pub fn from_json(&mut self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let values: Vec<Value> = items.iter().map(|item| self.from_json(item)).collect();
                self.array(values)
            }
            serde_json::Value::Object(map) => {
                let obj = self.object();
                for (key, item) in map {
                    let value = self.from_json(item);
                    if let Some(r) = obj.as_composite() {
                        self.objects[r.index()]
                            .attributes
                            .push(AttributeRecord::data(key.as_str(), value));
                    }
                }
                obj
            }
        }
    }

    // ----- Mutation -----

    /// Define (or overwrite) an ordinary data attribute.
    pub fn define(&mut self, target: &Value, key: impl Into<PropertyKey>, value: Value) -> Result<()> {
        self.define_attribute(target, AttributeRecord::data(key, value))
    }

    /// Define an attribute with explicit descriptor flags.
    pub fn define_attribute(&mut self, target: &Value, record: AttributeRecord) -> Result<()> {
        let r = self.composite(target, "define_attribute")?;
        let key_label = self.key_label(&record.key);
        let is_array = matches!(self.objects[r.index()].kind, ObjectKind::Array);
        let object = &mut self.objects[r.index()];

        if let Some(existing) = object.attributes.iter_mut().find(|a| a.key == record.key) {
            if !existing.configurable {
                return Err(DeepEqError::NotConfigurable { key: key_label });
            }
            let intrinsic = existing.intrinsic;
            *existing = record;
            existing.intrinsic = intrinsic;
            return Ok(());
        }
        if !object.extensible {
            return Err(DeepEqError::NotExtensible { key: key_label });
        }

        match (is_array, record.key.as_index()) {
            (true, Some(index)) => {
                let position = object
                    .attributes
                    .iter()
                    .position(|a| a.key.as_index().map_or(true, |i| i > index))
                    .unwrap_or(object.attributes.len());
                object.attributes.insert(position, record);
                let new_length = (index + 1) as f64;
                if let Some(length) = object
                    .attributes
                    .iter_mut()
                    .find(|a| a.key == PropertyKey::from("length"))
                {
                    if let AttributeKind::Data(Value::Number(n)) = &mut length.kind {
                        if *n < new_length {
                            *n = new_length;
                        }
                    }
                }
            }
            _ => object.attributes.push(record),
        }
        Ok(())
    }

    /// Define an accessor attribute from getter/setter functions.
    pub fn define_accessor(
        &mut self,
        target: &Value,
        key: impl Into<PropertyKey>,
        get: Option<Value>,
        set: Option<Value>,
    ) -> Result<()> {
        self.define_attribute(target, AttributeRecord::accessor(key, get, set))
    }

    /// Append to an array.
    pub fn push(&mut self, target: &Value, value: Value) -> Result<()> {
        let r = self.composite(target, "push")?;
        let length = self
            .own_value(r, "length")
            .and_then(|v| v.as_number())
            .ok_or_else(|| DeepEqError::NotAComposite {
                op: "push".to_string(),
                found: "non-array composite".to_string(),
            })?;
        self.define(target, (length as usize).to_string(), value)
    }

    pub fn set_add(&mut self, target: &Value, value: Value) -> Result<()> {
        let r = self.composite(target, "set_add")?;
        match &mut self.objects[r.index()].kind {
            ObjectKind::Set(values) => {
                if !values.iter().any(|v| v.same_value(&value)) {
                    values.push(value);
                }
                Ok(())
            }
            _ => Err(DeepEqError::NotAComposite {
                op: "set_add".to_string(),
                found: "non-set composite".to_string(),
            }),
        }
    }

    pub fn map_insert(&mut self, target: &Value, key: Value, value: Value) -> Result<()> {
        let r = self.composite(target, "map_insert")?;
        if !matches!(self.objects[r.index()].kind, ObjectKind::Map(_)) {
            return Err(DeepEqError::NotAComposite {
                op: "map_insert".to_string(),
                found: "non-map composite".to_string(),
            });
        }
        self.upsert_map_entry(r, key, value);
        Ok(())
    }

    fn upsert_map_entry(&mut self, r: CompositeRef, key: Value, value: Value) {
        if let ObjectKind::Map(entries) = &mut self.objects[r.index()].kind {
            match entries.iter_mut().find(|(k, _)| k.same_value(&key)) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    pub fn set_delegation_parent(&mut self, target: &Value, parent: Value) -> Result<()> {
        let r = self.composite(target, "set_delegation_parent")?;
        check_parent(&parent, "set_delegation_parent")?;
        self.objects[r.index()].parent = parent;
        Ok(())
    }

    /// Install a `valueOf`-style hook used by the coercion phase.
    pub fn set_coercion_hook(&mut self, target: &Value, hook: impl Fn() -> Value + 'static) -> Result<()> {
        let r = self.composite(target, "set_coercion_hook")?;
        self.objects[r.index()].coercion = Some(NativeFn::new(hook));
        Ok(())
    }

    pub fn prevent_extensions(&mut self, target: &Value) -> Result<()> {
        let r = self.composite(target, "prevent_extensions")?;
        self.objects[r.index()].extensible = false;
        Ok(())
    }

    pub fn seal(&mut self, target: &Value) -> Result<()> {
        let r = self.composite(target, "seal")?;
        let object = &mut self.objects[r.index()];
        object.extensible = false;
        for attribute in &mut object.attributes {
            attribute.configurable = false;
        }
        Ok(())
    }

    pub fn freeze(&mut self, target: &Value) -> Result<()> {
        let r = self.composite(target, "freeze")?;
        let object = &mut self.objects[r.index()];
        object.extensible = false;
        for attribute in &mut object.attributes {
            attribute.configurable = false;
            if !attribute.is_accessor() {
                attribute.writable = false;
            }
        }
        Ok(())
    }

    // ----- Helpers -----

    fn composite(&self, value: &Value, op: &str) -> Result<CompositeRef> {
        match value {
            Value::Composite(r) if r.index() < self.objects.len() => Ok(*r),
            other => Err(DeepEqError::NotAComposite {
                op: op.to_string(),
                found: self.describe(other),
            }),
        }
    }

    fn describe(&self, value: &Value) -> String {
        match value {
            Value::Composite(r) if r.index() >= self.objects.len() => {
                "foreign composite".to_string()
            }
            other => other.type_name().to_string(),
        }
    }

    fn key_label(&self, key: &PropertyKey) -> String {
        match key {
            PropertyKey::String(s) => s.clone(),
            PropertyKey::Symbol(id) => format!(
                "Symbol({})",
                self.symbol_description(*id).unwrap_or_default()
            ),
        }
    }

    fn build_well_known(&self) -> HashMap<CompositeRef, String> {
        let mut table = HashMap::new();
        table.insert(self.realm.global, "globalThis".to_string());
        let mut queue = VecDeque::from([(self.realm.global, String::new(), 0usize)]);
        while let Some((r, prefix, depth)) = queue.pop_front() {
            for attribute in &self.objects[r.index()].attributes {
                let (PropertyKey::String(name), AttributeKind::Data(Value::Composite(child))) =
                    (&attribute.key, &attribute.kind)
                else {
                    continue;
                };
                if table.contains_key(child) {
                    continue;
                }
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                table.insert(*child, path.clone());
                if depth + 1 < WELL_KNOWN_DEPTH {
                    queue.push_back((*child, path, depth + 1));
                }
            }
        }
        table
    }
}

fn check_parent(parent: &Value, op: &str) -> Result<()> {
    match parent {
        Value::Null | Value::Composite(_) => Ok(()),
        other => Err(DeepEqError::NotAComposite {
            op: op.to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

fn function_intrinsic(key: &str, value: Value) -> AttributeRecord {
    AttributeRecord::data(key, value)
        .writable(false)
        .enumerable(false)
        .intrinsic()
}

fn array_length(length: f64) -> AttributeRecord {
    AttributeRecord::data("length", Value::Number(length))
        .enumerable(false)
        .configurable(false)
        .intrinsic()
}

fn frozen_attribute(key: &str, value: Value) -> AttributeRecord {
    AttributeRecord::data(key, value)
        .writable(false)
        .enumerable(false)
        .configurable(false)
}

impl ValueAdapter for Heap {
    fn attributes_of(&self, composite: CompositeRef) -> Vec<AttributeRecord> {
        self.objects
            .get(composite.index())
            .map(|o| o.attributes.clone())
            .unwrap_or_default()
    }

    fn delegation_parent_of(&self, composite: CompositeRef) -> Value {
        self.objects
            .get(composite.index())
            .map(|o| o.parent.clone())
            .unwrap_or(Value::Null)
    }

    fn coercion_hook_of(&self, composite: CompositeRef) -> Option<CoercionHook> {
        self.objects
            .get(composite.index())
            .and_then(|o| o.coercion.clone())
    }

    fn collection_entries_of(&self, composite: CompositeRef) -> Option<CollectionEntries> {
        match &self.objects.get(composite.index())?.kind {
            ObjectKind::Set(values) => Some(CollectionEntries::Unique(values.clone())),
            ObjectKind::Map(entries) => Some(CollectionEntries::Keyed(entries.clone())),
            _ => None,
        }
    }

    fn is_extensible(&self, composite: CompositeRef) -> bool {
        self.objects
            .get(composite.index())
            .map_or(true, |o| o.extensible)
    }

    fn shape_of(&self, composite: CompositeRef) -> Shape {
        let Some(object) = self.objects.get(composite.index()) else {
            return Shape::Object { class_name: None };
        };
        match &object.kind {
            ObjectKind::Ordinary => {
                let class_name = object
                    .parent
                    .as_composite()
                    .filter(|p| *p != self.realm.object_prototype)
                    .and_then(|p| self.own_value(p, "constructor"))
                    .and_then(|ctor| ctor.as_composite())
                    .and_then(|ctor| self.function_name_of(ctor))
                    .filter(|name| !name.is_empty());
                Shape::Object { class_name }
            }
            ObjectKind::Array => Shape::Array,
            ObjectKind::Function { name, .. } => Shape::Function { name: name.clone() },
            ObjectKind::Set(_) => Shape::Set,
            ObjectKind::Map(_) => Shape::Map,
            ObjectKind::Pattern { source, flags } => Shape::Pattern {
                source: source.clone(),
                flags: flags.clone(),
            },
        }
    }

    fn well_known_path(&self, composite: CompositeRef) -> Option<String> {
        self.well_known
            .get_or_init(|| self.build_well_known())
            .get(&composite)
            .cloned()
    }

    fn symbol_description(&self, symbol: SymbolId) -> Option<String> {
        if well_known::is_well_known_symbol(symbol) {
            return well_known::symbol_path(symbol).map(str::to_string);
        }
        let index = symbol.0.checked_sub(FIRST_USER_SYMBOL)? as usize;
        self.symbols.get(index).cloned().flatten()
    }

    fn resolve_accessor(&self, getter: &Value) -> Option<Value> {
        let r = getter.as_composite()?;
        match &self.objects.get(r.index())?.kind {
            ObjectKind::Function {
                body: Some(body), ..
            } => Some(body.invoke()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::IntegrityLevel;

    #[test]
    fn test_realm_well_known_paths() {
        let heap = Heap::new();
        let realm = *heap.realm();
        assert_eq!(
            heap.well_known_path(realm.array_prototype).as_deref(),
            Some("Array.prototype")
        );
        assert_eq!(
            heap.well_known_path(realm.object_constructor).as_deref(),
            Some("Object")
        );
        assert_eq!(
            heap.well_known_path(realm.global).as_deref(),
            Some("globalThis")
        );
    }

    #[test]
    fn test_user_objects_are_not_well_known() {
        let mut heap = Heap::new();
        let obj = heap.object();
        let r = obj.as_composite().unwrap();
        assert_eq!(heap.well_known_path(r), None);
    }

    #[test]
    fn test_array_length_tracks_defines() {
        let mut heap = Heap::new();
        let arr = heap.array([Value::from(1)]);
        heap.push(&arr, Value::from(2)).unwrap();
        heap.define(&arr, "4", Value::from(5)).unwrap();
        let r = arr.as_composite().unwrap();
        assert_eq!(heap.own_value(r, "length").unwrap().as_number(), Some(5.0));
        let keys: Vec<PropertyKey> = heap.attributes_of(r).into_iter().map(|a| a.key).collect();
        assert_eq!(
            keys,
            vec![
                PropertyKey::from("0"),
                PropertyKey::from("1"),
                PropertyKey::from("4"),
                PropertyKey::from("length"),
            ]
        );
    }

    #[test]
    fn test_freeze_and_seal_levels() {
        let mut heap = Heap::new();
        let frozen = heap.object();
        heap.define(&frozen, "a", Value::from(1)).unwrap();
        heap.freeze(&frozen).unwrap();
        let sealed = heap.object();
        heap.define(&sealed, "a", Value::from(1)).unwrap();
        heap.seal(&sealed).unwrap();
        let closed = heap.object();
        heap.define(&closed, "a", Value::from(1)).unwrap();
        heap.prevent_extensions(&closed).unwrap();

        assert_eq!(
            heap.integrity_level_of(frozen.as_composite().unwrap()),
            IntegrityLevel::Frozen
        );
        assert_eq!(
            heap.integrity_level_of(sealed.as_composite().unwrap()),
            IntegrityLevel::Sealed
        );
        assert_eq!(
            heap.integrity_level_of(closed.as_composite().unwrap()),
            IntegrityLevel::None
        );
        assert!(!heap.is_extensible(closed.as_composite().unwrap()));
    }

    #[test]
    fn test_define_on_frozen_fails() {
        let mut heap = Heap::new();
        let obj = heap.object();
        heap.define(&obj, "a", Value::from(1)).unwrap();
        heap.freeze(&obj).unwrap();
        assert!(matches!(
            heap.define(&obj, "b", Value::from(1)),
            Err(DeepEqError::NotExtensible { .. })
        ));
        assert!(matches!(
            heap.define(&obj, "a", Value::from(2)),
            Err(DeepEqError::NotConfigurable { .. })
        ));
    }

    #[test]
    fn test_define_on_primitive_fails() {
        let mut heap = Heap::new();
        let err = heap.define(&Value::from(1), "a", Value::Null).unwrap_err();
        assert!(matches!(err, DeepEqError::NotAComposite { .. }));
    }

    #[test]
    fn test_class_instances_report_class_name() {
        let mut heap = Heap::new();
        let user = heap.class("User");
        let instance = heap.instance(&user).unwrap();
        assert_eq!(
            heap.shape_of(instance.as_composite().unwrap()),
            Shape::Object {
                class_name: Some("User".to_string())
            }
        );
    }

    #[test]
    fn test_symbols() {
        let mut heap = Heap::new();
        let sym = heap.symbol(Some("token"));
        let Value::Symbol(id) = sym else {
            panic!("expected symbol");
        };
        assert_eq!(heap.symbol_description(id).as_deref(), Some("token"));
        assert_eq!(
            heap.symbol_description(WellKnownSymbol::Iterator.id()).as_deref(),
            Some("Symbol.iterator")
        );
    }

    #[test]
    fn test_collections_dedupe() {
        let mut heap = Heap::new();
        let set = heap.set([Value::from(1), Value::from(1), Value::from(2)]);
        let map = heap.map([
            (Value::from("a"), Value::from(1)),
            (Value::from("a"), Value::from(2)),
        ]);
        let set_entries = heap.collection_entries_of(set.as_composite().unwrap()).unwrap();
        let map_entries = heap.collection_entries_of(map.as_composite().unwrap()).unwrap();
        assert_eq!(set_entries.len(), 2);
        assert_eq!(map_entries.len(), 1);
    }

    #[test]
    fn test_native_getter_resolves() {
        let mut heap = Heap::new();
        let getter = heap.native_function("get", || Value::from(7));
        assert_eq!(
            heap.resolve_accessor(&getter).and_then(|v| v.as_number()),
            Some(7.0)
        );
        let plain = heap.function("plain");
        assert!(heap.resolve_accessor(&plain).is_none());
    }

    #[test]
    fn test_from_json_builds_arrays_and_objects() {
        let mut heap = Heap::new();
        let value = heap.from_json(&serde_json::json!({"a": [1, 2], "b": null}));
        let r = value.as_composite().unwrap();
        let arr = heap.own_value(r, "a").unwrap().as_composite().unwrap();
        assert_eq!(heap.shape_of(arr), Shape::Array);
        assert!(matches!(heap.own_value(r, "b"), Some(Value::Null)));
    }
}
