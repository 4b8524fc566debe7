//! Comparator: builds the comparison tree for an actual/expected pair.

pub mod engine;
pub mod frames;
pub mod model;

pub use engine::{compare, CompareOptions};
pub use frames::FrameRegistry;
pub use model::{
    ComparisonKind, ComparisonNode, DescriptorFlag, KeyLabel, NodeDetail, Path, PathSegment,
    ReasonSet, Reasons, ReferenceOutcome,
};
