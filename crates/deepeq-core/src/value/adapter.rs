use super::well_known;
use super::{
    AttributeKind, AttributeRecord, CoercionHook, CollectionEntries, CompositeRef, IntegrityLevel,
    PropertyKey, Shape, SymbolId, Value,
};

/// Read-only view of a value runtime.
///
/// Every query the comparator, renderer and message builders make about a
/// composite goes through this trait, so the same engine works over an
/// arena heap, a JSON document or a foreign runtime. Implementations must be
/// side-effect free apart from invoking coercion hooks and getters the
/// caller asks for.
pub trait ValueAdapter {
    /// Own attributes in definition order (string keys and symbol keys
    /// interleaved as defined).
    fn attributes_of(&self, composite: CompositeRef) -> Vec<AttributeRecord>;

    /// Delegation parent (prototype); `Value::Null` at the end of the chain.
    fn delegation_parent_of(&self, composite: CompositeRef) -> Value;

    fn coercion_hook_of(&self, composite: CompositeRef) -> Option<CoercionHook>;

    /// `None` for composites that are not collections.
    fn collection_entries_of(&self, composite: CompositeRef) -> Option<CollectionEntries>;

    fn is_extensible(&self, composite: CompositeRef) -> bool;

    fn shape_of(&self, composite: CompositeRef) -> Shape;

    /// Derived from extensibility and the attribute flags.
    fn integrity_level_of(&self, composite: CompositeRef) -> IntegrityLevel {
        if self.is_extensible(composite) {
            return IntegrityLevel::None;
        }
        let attributes = self.attributes_of(composite);
        if attributes.iter().any(|a| a.configurable) {
            IntegrityLevel::None
        } else if attributes
            .iter()
            .any(|a| matches!(a.kind, AttributeKind::Data(_)) && a.writable)
        {
            IntegrityLevel::Sealed
        } else {
            IntegrityLevel::Frozen
        }
    }

    /// Canonical `/source/flags` form for pattern composites.
    fn pattern_source_of(&self, composite: CompositeRef) -> Option<String> {
        match self.shape_of(composite) {
            Shape::Pattern { source, flags } => Some(format!("/{}/{}", source, flags)),
            _ => None,
        }
    }

    /// Display path (`Array.prototype`) when the composite is a well-known
    /// singleton of the runtime.
    fn well_known_path(&self, _composite: CompositeRef) -> Option<String> {
        None
    }

    /// Description of a symbol, without the `Symbol(...)` wrapper.
    fn symbol_description(&self, symbol: SymbolId) -> Option<String> {
        well_known::symbol_path(symbol).map(str::to_string)
    }

    /// Run a getter and return its result; `None` when the getter cannot be
    /// invoked safely.
    fn resolve_accessor(&self, _getter: &Value) -> Option<Value> {
        None
    }

    fn function_name_of(&self, composite: CompositeRef) -> Option<String> {
        match self.shape_of(composite) {
            Shape::Function { name } => Some(name),
            _ => None,
        }
    }

    /// `constructor` data attribute of a delegation parent.
    fn constructor_of(&self, parent: CompositeRef) -> Option<Value> {
        self.own_value(parent, "constructor")
    }

    /// Own data attribute lookup by string key.
    fn own_value(&self, composite: CompositeRef, key: &str) -> Option<Value> {
        self.attributes_of(composite)
            .into_iter()
            .find(|a| a.key == PropertyKey::String(key.to_string()))
            .and_then(|a| match a.kind {
                AttributeKind::Data(v) => Some(v),
                AttributeKind::Accessor { .. } => None,
            })
    }
}
