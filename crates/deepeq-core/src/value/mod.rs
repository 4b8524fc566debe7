//! Value model: the dynamic values the comparator walks, plus the adapter
//! seam through which it reads composites.
//!
//! Values are cheap handles. Primitives are held inline; composites are
//! opaque [`CompositeRef`]s that only mean something to the
//! [`ValueAdapter`] that produced them. Two concrete adapters ship here:
//! the arena runtime in [`heap`] and a read-only view over `serde_json`
//! documents in [`json`].

pub mod adapter;
pub mod heap;
pub mod json;
pub mod well_known;

use crate::expect::Expectation;
use std::fmt;
use std::rc::Rc;

pub use adapter::ValueAdapter;
pub use heap::{Heap, Realm};
pub use json::JsonAdapter;
pub use well_known::WellKnownSymbol;

/// Opaque identity of a composite inside one adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeRef(pub u32);

impl CompositeRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a symbol. Ids below [`well_known::FIRST_USER_SYMBOL`] are the
/// well-known symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Callable with no arguments, used for getters and coercion hooks.
#[derive(Clone)]
pub struct NativeFn(Rc<dyn Fn() -> Value>);

impl NativeFn {
    pub fn new(f: impl Fn() -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn invoke(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeFn(..)")
    }
}

/// Hook that converts a composite to a primitive (`valueOf`-style).
pub type CoercionHook = NativeFn;

/// A dynamic value.
///
/// Structural equality lives in [`crate::compare`]; primitive identity is
/// [`Value::same_value`].
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(SymbolId),
    Composite(CompositeRef),
    /// Expectation combinator; only meaningful on the expected side
    Expectation(Rc<Expectation>),
}

/// Coarse classification driving the first comparator branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Primitive,
    Composite,
    Expectation,
}

impl Value {
    pub fn classify(&self) -> Classification {
        match self {
            Value::Composite(_) => Classification::Composite,
            Value::Expectation(_) => Classification::Expectation,
            _ => Classification::Primitive,
        }
    }

    pub fn as_composite(&self) -> Option<CompositeRef> {
        match self {
            Value::Composite(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.classify() == Classification::Primitive
    }

    /// Short lowercase type name used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Composite(_) => "object",
            Value::Expectation(_) => "expectation",
        }
    }

    /// Identity in the `Object.is` sense: `NaN` equals `NaN`, `-0` differs
    /// from `+0`, composites compare by reference and expectations by
    /// allocation.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Composite(a), Value::Composite(b)) => a == b,
            (Value::Expectation(a), Value::Expectation(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Expectation> for Value {
    fn from(e: Expectation) -> Self {
        Value::Expectation(Rc::new(e))
    }
}

/// Key of an attribute: a string name or an internal (symbol) key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(String),
    Symbol(SymbolId),
}

impl PropertyKey {
    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    /// Array index this key denotes, if it is a canonical index string.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PropertyKey::String(s) => parse_index(s),
            PropertyKey::Symbol(_) => None,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::String(s)
    }
}

impl From<SymbolId> for PropertyKey {
    fn from(id: SymbolId) -> Self {
        PropertyKey::Symbol(id)
    }
}

pub(crate) fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Data or accessor half of an attribute.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    Data(Value),
    Accessor {
        get: Option<Value>,
        set: Option<Value>,
    },
}

/// One attribute with its descriptor flags.
#[derive(Debug, Clone)]
pub struct AttributeRecord {
    pub key: PropertyKey,
    pub kind: AttributeKind,
    /// Meaningless for accessors; kept `false` there
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
    /// Shape-implied attribute (`length` of arrays and functions, `name`,
    /// `lastIndex`, ...): excluded from presence and order checks and from
    /// rendering unless it differs
    pub intrinsic: bool,
}

impl AttributeRecord {
    /// Ordinary assignment semantics: writable, enumerable, configurable.
    pub fn data(key: impl Into<PropertyKey>, value: Value) -> Self {
        Self {
            key: key.into(),
            kind: AttributeKind::Data(value),
            writable: true,
            enumerable: true,
            configurable: true,
            intrinsic: false,
        }
    }

    pub fn accessor(key: impl Into<PropertyKey>, get: Option<Value>, set: Option<Value>) -> Self {
        Self {
            key: key.into(),
            kind: AttributeKind::Accessor { get, set },
            writable: false,
            enumerable: true,
            configurable: true,
            intrinsic: false,
        }
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    pub fn intrinsic(mut self) -> Self {
        self.intrinsic = true;
        self
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            AttributeKind::Data(v) => Some(v),
            AttributeKind::Accessor { .. } => None,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, AttributeKind::Accessor { .. })
    }
}

/// How locked-down a composite is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegrityLevel {
    None,
    Sealed,
    Frozen,
}

impl IntegrityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            IntegrityLevel::None => "none",
            IntegrityLevel::Sealed => "sealed",
            IntegrityLevel::Frozen => "frozen",
        }
    }
}

/// Structural shape, used for delimiters and wording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Object { class_name: Option<String> },
    Array,
    Function { name: String },
    Set,
    Map,
    Pattern { source: String, flags: String },
}

impl Shape {
    pub fn is_array(&self) -> bool {
        matches!(self, Shape::Array)
    }

    /// Plural noun for the entries of this shape.
    /// Unit used by overflow markers, singular for a count of one.
    pub fn entry_unit(&self, count: usize) -> &'static str {
        match (self, count) {
            (Shape::Array | Shape::Set, 1) => "value",
            (Shape::Array | Shape::Set, _) => "values",
            (Shape::Map, 1) => "entry",
            (Shape::Map, _) => "entries",
            (_, 1) => "prop",
            _ => "props",
        }
    }
}

/// Entries of a collection composite.
#[derive(Debug, Clone)]
pub enum CollectionEntries {
    /// Set-like: ordered unique values
    Unique(Vec<Value>),
    /// Map-like: ordered key/value pairs
    Keyed(Vec<(Value, Value)>),
}

impl CollectionEntries {
    pub fn len(&self) -> usize {
        match self {
            CollectionEntries::Unique(v) => v.len(),
            CollectionEntries::Keyed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_value_zero_sign() {
        assert!(!Value::Number(0.0).same_value(&Value::Number(-0.0)));
        assert!(Value::Number(-0.0).same_value(&Value::Number(-0.0)));
    }

    #[test]
    fn test_same_value_nan() {
        assert!(Value::Number(f64::NAN).same_value(&Value::Number(f64::NAN)));
    }

    #[test]
    fn test_same_value_across_types() {
        assert!(!Value::from("1").same_value(&Value::from(1)));
        assert!(!Value::Null.same_value(&Value::Undefined));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("12"), Some(12));
        assert_eq!(parse_index("01"), None);
        assert_eq!(parse_index("-1"), None);
        assert_eq!(parse_index("length"), None);
    }

    #[test]
    fn test_attribute_builders() {
        let attr = AttributeRecord::data("a", Value::Null)
            .enumerable(false)
            .writable(false);
        assert!(!attr.enumerable);
        assert!(!attr.writable);
        assert!(attr.configurable);
        assert!(!attr.is_accessor());
    }
}
