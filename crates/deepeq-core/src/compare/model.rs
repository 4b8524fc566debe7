//! Comparison tree data model.

use crate::expect::{CombinatorKind, ExpectationFailure};
use crate::value::{IntegrityLevel, PropertyKey, SymbolId, Value};
use std::fmt;

/// Which check a node records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    /// Default value comparison (primitive identity or structural recursion)
    Identity,
    /// Prior-reference consistency (cycles, shared references)
    Reference,
    DelegationParent,
    Integrity,
    Extensibility,
    AttributeSet,
    AttributeOrder,
    /// One descriptor flag, or a getter/setter pair member
    AttributeDescriptor,
    InternalKeys,
    CollectionEntry,
    CollectionSize,
    CoercionResult,
    PatternSource,
    Combinator(CombinatorKind),
}

impl ComparisonKind {
    /// Stable identifier used in logs and the CLI.
    pub fn code(&self) -> &'static str {
        match self {
            ComparisonKind::Identity => "identity",
            ComparisonKind::Reference => "reference",
            ComparisonKind::DelegationParent => "delegation-parent",
            ComparisonKind::Integrity => "integrity",
            ComparisonKind::Extensibility => "extensibility",
            ComparisonKind::AttributeSet => "attribute-set",
            ComparisonKind::AttributeOrder => "attribute-order",
            ComparisonKind::AttributeDescriptor => "attribute-descriptor",
            ComparisonKind::InternalKeys => "internal-keys",
            ComparisonKind::CollectionEntry => "collection-entry",
            ComparisonKind::CollectionSize => "collection-size",
            ComparisonKind::CoercionResult => "coercion-result",
            ComparisonKind::PatternSource => "pattern-source",
            ComparisonKind::Combinator(CombinatorKind::Not) => "combinator:not",
            ComparisonKind::Combinator(CombinatorKind::Any) => "combinator:any",
            ComparisonKind::Combinator(CombinatorKind::Matches) => "combinator:matches",
            ComparisonKind::Combinator(CombinatorKind::CloseTo) => "combinator:closeTo",
            ComparisonKind::Combinator(CombinatorKind::StartsWith) => "combinator:startsWith",
            ComparisonKind::Combinator(CombinatorKind::Between) => "combinator:between",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFlag {
    Writable,
    Enumerable,
    Configurable,
    /// Data attribute on one side, accessor on the other
    Kind,
}

impl DescriptorFlag {
    pub fn name(&self) -> &'static str {
        match self {
            DescriptorFlag::Writable => "writable",
            DescriptorFlag::Enumerable => "enumerable",
            DescriptorFlag::Configurable => "configurable",
            DescriptorFlag::Kind => "accessor",
        }
    }
}

/// Key of an attribute as it appears in paths and diff labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLabel {
    Name(String),
    Index(usize),
    Symbol { id: SymbolId, description: String },
}

impl KeyLabel {
    pub fn matches_key(&self, key: &PropertyKey) -> bool {
        match (self, key) {
            (KeyLabel::Name(name), PropertyKey::String(s)) => name == s,
            (KeyLabel::Index(i), PropertyKey::String(_)) => key.as_index() == Some(*i),
            (KeyLabel::Symbol { id, .. }, PropertyKey::Symbol(other)) => id == other,
            _ => false,
        }
    }

    /// Bare display form (`a`, `0`, `Symbol(foo)`).
    pub fn display(&self) -> String {
        match self {
            KeyLabel::Name(name) => name.clone(),
            KeyLabel::Index(i) => i.to_string(),
            KeyLabel::Symbol { description, .. } => symbol_display(description),
        }
    }

    fn write_access(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLabel::Name(name) if is_identifier(name) => write!(f, ".{}", name),
            KeyLabel::Name(name) => write!(f, "[{:?}]", name),
            KeyLabel::Index(i) => write!(f, "[{}]", i),
            KeyLabel::Symbol { description, .. } => write!(f, "[{}]", symbol_display(description)),
        }
    }
}

fn symbol_display(description: &str) -> String {
    if description.starts_with("Symbol.") {
        description.to_string()
    } else {
        format!("Symbol({})", description)
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Label of the edge from a parent node to this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Attribute(KeyLabel),
    DelegationParent,
    Descriptor { key: KeyLabel, flag: DescriptorFlag },
    Getter(KeyLabel),
    Setter(KeyLabel),
    SetEntry(usize),
    MapEntry {
        key: String,
        actual_index: Option<usize>,
        expected_index: Option<usize>,
    },
    Coercion,
    PatternSource,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Attribute(key) => key.write_access(f),
            PathSegment::DelegationParent => f.write_str("[[Prototype]]"),
            PathSegment::Descriptor { key, flag } => {
                key.write_access(f)?;
                write!(f, "[[{}]]", flag.name())
            }
            PathSegment::Getter(key) => {
                key.write_access(f)?;
                f.write_str("[[get]]")
            }
            PathSegment::Setter(key) => {
                key.write_access(f)?;
                f.write_str("[[set]]")
            }
            PathSegment::SetEntry(i) => write!(f, "[[entry {}]]", i),
            PathSegment::MapEntry { key, .. } => write!(f, ".get({})", key),
            PathSegment::Coercion => f.write_str(".valueOf()"),
            PathSegment::PatternSource => f.write_str(".toString()"),
        }
    }
}

/// Root-relative location of a node, displayed as `actual.a[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Path(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("actual")?;
        for segment in &self.0 {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Names added, removed or modified at some scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonSet {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

impl ReasonSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    fn merge(&mut self, other: &ReasonSet) {
        self.added.extend(other.added.iter().cloned());
        self.removed.extend(other.removed.iter().cloned());
        self.modified.extend(other.modified.iter().cloned());
    }
}

/// Reasons for the node's own check, for its children, and both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reasons {
    pub own: ReasonSet,
    pub inside: ReasonSet,
    pub overall: ReasonSet,
}

/// How a composite pair relates to earlier pairs in the same comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceOutcome {
    /// Same pair already compared at `target`
    Consistent { target: Path },
    /// Actual was seen before, paired with another expected value
    Unexpected { actual_target: Path },
    /// Expected was seen before, paired with another actual value
    Missing { expected_target: Path },
    /// Both were seen before, at different places
    Diverging {
        actual_target: Path,
        expected_target: Path,
    },
}

impl ReferenceOutcome {
    /// Target to display on one side, when that side is a back-reference.
    pub fn actual_target(&self) -> Option<&Path> {
        match self {
            ReferenceOutcome::Consistent { target } => Some(target),
            ReferenceOutcome::Unexpected { actual_target }
            | ReferenceOutcome::Diverging { actual_target, .. } => Some(actual_target),
            ReferenceOutcome::Missing { .. } => None,
        }
    }

    pub fn expected_target(&self) -> Option<&Path> {
        match self {
            ReferenceOutcome::Consistent { target } => Some(target),
            ReferenceOutcome::Missing { expected_target }
            | ReferenceOutcome::Diverging {
                expected_target, ..
            } => Some(expected_target),
            ReferenceOutcome::Unexpected { .. } => None,
        }
    }
}

/// Kind-specific facts a node records for rendering and messages.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetail {
    Reference(ReferenceOutcome),
    Expectation(ExpectationFailure),
    Integrity {
        actual: IntegrityLevel,
        expected: IntegrityLevel,
    },
    Extensibility {
        actual: bool,
        expected: bool,
    },
    Descriptor {
        flag: DescriptorFlag,
        actual: bool,
        expected: bool,
    },
    /// Common keys in each side's order
    Order {
        actual: Vec<String>,
        expected: Vec<String>,
    },
}

/// One recorded check.
///
/// `failed` is true iff `self_failed` is true or any child failed.
#[derive(Debug, Clone)]
pub struct ComparisonNode {
    pub kind: ComparisonKind,
    pub segment: Option<PathSegment>,
    pub actual: Option<Value>,
    pub expected: Option<Value>,
    pub children: Vec<ComparisonNode>,
    pub reasons: Reasons,
    pub detail: Option<NodeDetail>,
    pub self_failed: bool,
    pub failed: bool,
}

impl ComparisonNode {
    pub fn new(
        kind: ComparisonKind,
        segment: Option<PathSegment>,
        actual: Option<Value>,
        expected: Option<Value>,
    ) -> Self {
        Self {
            kind,
            segment,
            actual,
            expected,
            children: Vec::new(),
            reasons: Reasons::default(),
            detail: None,
            self_failed: false,
            failed: false,
        }
    }

    pub fn with_detail(mut self, detail: NodeDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Mark the node's own check as failed, recording `reasons`.
    pub fn fail(&mut self, reasons: ReasonSet) {
        self.self_failed = true;
        self.failed = true;
        self.reasons.overall.merge(&reasons);
        self.reasons.own.merge(&reasons);
    }

    /// Mark as failed with a single modified reason.
    pub fn fail_modified(&mut self, what: impl Into<String>) {
        self.fail(ReasonSet {
            modified: vec![what.into()],
            ..ReasonSet::default()
        });
    }

    pub fn push_child(&mut self, child: ComparisonNode) {
        if child.failed {
            self.failed = true;
            let mut inside = child.reasons.overall.clone();
            let label = child
                .segment
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| child.kind.code().to_string());
            inside.modified.push(label);
            self.reasons.inside.merge(&inside);
            self.reasons.overall.merge(&inside);
        }
        self.children.push(child);
    }

    pub fn child_by_kind(&self, kind: ComparisonKind) -> Option<&ComparisonNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    pub fn reference(&self) -> Option<&ReferenceOutcome> {
        match &self.detail {
            Some(NodeDetail::Reference(outcome)) => Some(outcome),
            _ => None,
        }
    }
}
