//! Well-known symbols and the process-wide path table for them.
//!
//! Well-known composites (the intrinsics of a runtime) are per-adapter and
//! exposed through [`ValueAdapter::well_known_path`](super::ValueAdapter);
//! the symbols are global to every adapter and live here.

use super::{PropertyKey, SymbolId};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Ids below this are reserved for [`WellKnownSymbol`].
pub const FIRST_USER_SYMBOL: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownSymbol {
    Iterator,
    AsyncIterator,
    HasInstance,
    IsConcatSpreadable,
    Match,
    MatchAll,
    Replace,
    Search,
    Species,
    Split,
    ToPrimitive,
    ToStringTag,
    Unscopables,
}

impl WellKnownSymbol {
    pub const ALL: [WellKnownSymbol; 13] = [
        Self::Iterator,
        Self::AsyncIterator,
        Self::HasInstance,
        Self::IsConcatSpreadable,
        Self::Match,
        Self::MatchAll,
        Self::Replace,
        Self::Search,
        Self::Species,
        Self::Split,
        Self::ToPrimitive,
        Self::ToStringTag,
        Self::Unscopables,
    ];

    /// Well-known symbols occupy ids 1..=13.
    pub fn id(self) -> SymbolId {
        SymbolId(self as u32 + 1)
    }

    pub fn key(self) -> PropertyKey {
        PropertyKey::Symbol(self.id())
    }

    /// Attribute name on the `Symbol` constructor (`iterator`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Iterator => "iterator",
            Self::AsyncIterator => "asyncIterator",
            Self::HasInstance => "hasInstance",
            Self::IsConcatSpreadable => "isConcatSpreadable",
            Self::Match => "match",
            Self::MatchAll => "matchAll",
            Self::Replace => "replace",
            Self::Search => "search",
            Self::Species => "species",
            Self::Split => "split",
            Self::ToPrimitive => "toPrimitive",
            Self::ToStringTag => "toStringTag",
            Self::Unscopables => "unscopables",
        }
    }
}

static SYMBOL_PATHS: OnceLock<BTreeMap<SymbolId, String>> = OnceLock::new();

fn symbol_paths() -> &'static BTreeMap<SymbolId, String> {
    SYMBOL_PATHS.get_or_init(|| {
        WellKnownSymbol::ALL
            .iter()
            .map(|sym| (sym.id(), format!("Symbol.{}", sym.name())))
            .collect()
    })
}

/// Canonical display path (`Symbol.iterator`) of a well-known symbol.
pub fn symbol_path(id: SymbolId) -> Option<&'static str> {
    symbol_paths().get(&id).map(String::as_str)
}

pub fn is_well_known_symbol(id: SymbolId) -> bool {
    id.0 > 0 && id.0 < FIRST_USER_SYMBOL
}
