//! Registry of composite pairs entered during one comparison.
//!
//! Every structurally compared pair is registered with the path where it was
//! first met. Later encounters of either member are resolved against the
//! registry instead of being walked again, which terminates cycles and
//! checks that shared references are shared the same way on both sides.

use super::model::{Path, ReferenceOutcome};
use crate::value::CompositeRef;

#[derive(Debug, Clone)]
struct Frame {
    actual: CompositeRef,
    expected: CompositeRef,
    path: Path,
}

#[derive(Debug, Default)]
pub struct FrameRegistry {
    frames: Vec<Frame>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, actual: CompositeRef, expected: CompositeRef, path: Path) {
        self.frames.push(Frame {
            actual,
            expected,
            path,
        });
    }

    /// `None` when neither member has been met before.
    pub fn lookup(&self, actual: CompositeRef, expected: CompositeRef) -> Option<ReferenceOutcome> {
        if let Some(frame) = self
            .frames
            .iter()
            .find(|f| f.actual == actual && f.expected == expected)
        {
            return Some(ReferenceOutcome::Consistent {
                target: frame.path.clone(),
            });
        }
        let by_actual = self.frames.iter().find(|f| f.actual == actual);
        let by_expected = self.frames.iter().find(|f| f.expected == expected);
        match (by_actual, by_expected) {
            (None, None) => None,
            (Some(a), None) => Some(ReferenceOutcome::Unexpected {
                actual_target: a.path.clone(),
            }),
            (None, Some(e)) => Some(ReferenceOutcome::Missing {
                expected_target: e.path.clone(),
            }),
            (Some(a), Some(e)) => Some(ReferenceOutcome::Diverging {
                actual_target: a.path.clone(),
                expected_target: e.path.clone(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
