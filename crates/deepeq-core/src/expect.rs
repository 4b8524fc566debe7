//! Expectation combinators: leaf predicates placed on the expected side
//! that replace the default comparison at that position.
//!
//! ```
//! use deepeq_core::expect;
//! use deepeq_core::{AssertOptions, Heap, Value};
//!
//! let heap = Heap::new();
//! let expected = expect::between(100.0, 200.0).unwrap();
//! let err = deepeq_core::assert(&heap, AssertOptions::new(Value::from(50), expected)).unwrap_err();
//! assert!(err.message().contains("too small"));
//! ```

use crate::errors::{DeepEqError, ExError};
use crate::value::{CompositeRef, Value, ValueAdapter};
use regex::Regex;
use std::collections::HashSet;

/// Highest accepted `close_to` precision (decimal digits).
pub const MAX_PRECISION: u32 = 15;
pub const DEFAULT_PRECISION: u32 = 2;

#[derive(Debug, Clone)]
pub enum AnyKind {
    /// Match a constructor by identity, or by function name
    Constructor(Value),
    /// Match a constructor by function name only
    Named(String),
}

#[derive(Debug, Clone)]
pub enum Expectation {
    Not(Value),
    Any(AnyKind),
    Matches(Regex),
    CloseTo { expected: f64, precision: u32 },
    StartsWith(String),
    Between { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinatorKind {
    Not,
    Any,
    Matches,
    CloseTo,
    StartsWith,
    Between,
}

impl CombinatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            CombinatorKind::Not => "not",
            CombinatorKind::Any => "any",
            CombinatorKind::Matches => "matches",
            CombinatorKind::CloseTo => "closeTo",
            CombinatorKind::StartsWith => "startsWith",
            CombinatorKind::Between => "between",
        }
    }
}

/// Why a combinator rejected the actual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectationFailure {
    EqualToForbidden,
    NotAnInstance,
    NotAString,
    NoMatch,
    NotANumber,
    NotCloseEnough,
    TooSmall,
    TooBig,
    PrefixMismatch,
}

impl Expectation {
    pub fn kind(&self) -> CombinatorKind {
        match self {
            Expectation::Not(_) => CombinatorKind::Not,
            Expectation::Any(_) => CombinatorKind::Any,
            Expectation::Matches(_) => CombinatorKind::Matches,
            Expectation::CloseTo { .. } => CombinatorKind::CloseTo,
            Expectation::StartsWith(_) => CombinatorKind::StartsWith,
            Expectation::Between { .. } => CombinatorKind::Between,
        }
    }

    /// Run the predicate against `actual`.
    pub fn evaluate(
        &self,
        adapter: &dyn ValueAdapter,
        actual: &Value,
    ) -> Result<(), ExpectationFailure> {
        match self {
            Expectation::Not(forbidden) => {
                if actual.same_value(forbidden) {
                    Err(ExpectationFailure::EqualToForbidden)
                } else {
                    Ok(())
                }
            }
            Expectation::Any(kind) => {
                if is_instance(adapter, actual, kind) {
                    Ok(())
                } else {
                    Err(ExpectationFailure::NotAnInstance)
                }
            }
            Expectation::Matches(regex) => {
                let text = actual.as_str().ok_or(ExpectationFailure::NotAString)?;
                if regex.is_match(text) {
                    Ok(())
                } else {
                    Err(ExpectationFailure::NoMatch)
                }
            }
            Expectation::CloseTo {
                expected,
                precision,
            } => {
                let n = actual
                    .as_number()
                    .filter(|n| !n.is_nan())
                    .ok_or(ExpectationFailure::NotANumber)?;
                if (n - expected).abs() < tolerance(*precision) {
                    Ok(())
                } else {
                    Err(ExpectationFailure::NotCloseEnough)
                }
            }
            Expectation::StartsWith(prefix) => {
                let text = actual.as_str().ok_or(ExpectationFailure::NotAString)?;
                if text.starts_with(prefix.as_str()) {
                    Ok(())
                } else {
                    Err(ExpectationFailure::PrefixMismatch)
                }
            }
            Expectation::Between { min, max } => {
                let n = actual
                    .as_number()
                    .filter(|n| !n.is_nan())
                    .ok_or(ExpectationFailure::NotANumber)?;
                if n < *min {
                    Err(ExpectationFailure::TooSmall)
                } else if n > *max {
                    Err(ExpectationFailure::TooBig)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Accepted distance for `close_to` at `precision` digits.
pub fn tolerance(precision: u32) -> f64 {
    10f64.powi(-(precision as i32)) / 2.0
}

fn primitive_constructor_name(value: &Value) -> Option<&'static str> {
    match value {
        Value::Bool(_) => Some("Boolean"),
        Value::Number(_) => Some("Number"),
        Value::BigInt(_) => Some("BigInt"),
        Value::String(_) => Some("String"),
        Value::Symbol(_) => Some("Symbol"),
        _ => None,
    }
}

fn constructor_matches(adapter: &dyn ValueAdapter, candidate: &Value, kind: &AnyKind) -> bool {
    let candidate_name = candidate
        .as_composite()
        .and_then(|c| adapter.function_name_of(c))
        .filter(|n| !n.is_empty());
    match kind {
        AnyKind::Constructor(wanted) => {
            candidate.same_value(wanted)
                || match (
                    candidate_name,
                    wanted.as_composite().and_then(|w| adapter.function_name_of(w)),
                ) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
        }
        AnyKind::Named(name) => candidate_name.as_deref() == Some(name.as_str()),
    }
}

fn is_instance(adapter: &dyn ValueAdapter, actual: &Value, kind: &AnyKind) -> bool {
    let Some(start) = actual.as_composite() else {
        let Some(wrapper) = primitive_constructor_name(actual) else {
            return false;
        };
        return match kind {
            AnyKind::Named(name) => name == wrapper,
            AnyKind::Constructor(wanted) => wanted
                .as_composite()
                .and_then(|w| adapter.function_name_of(w))
                .is_some_and(|n| n == wrapper),
        };
    };

    let mut seen: HashSet<CompositeRef> = HashSet::new();
    let mut current = adapter.delegation_parent_of(start);
    while let Value::Composite(parent) = current {
        if !seen.insert(parent) {
            break;
        }
        if let Some(ctor) = adapter.constructor_of(parent) {
            if constructor_matches(adapter, &ctor, kind) {
                return true;
            }
        }
        current = adapter.delegation_parent_of(parent);
    }
    false
}

// ----- Constructors -----

/// Passes when the actual value is not identical to `value`.
pub fn not(value: impl Into<Value>) -> Value {
    Expectation::Not(value.into()).into()
}

/// Passes when the actual value's delegation chain contains `constructor`.
pub fn any(constructor: Value) -> Result<Value, ExError> {
    if constructor.as_composite().is_none() {
        return Err(DeepEqError::InvalidConstructor {
            found: constructor.type_name().to_string(),
        }
        .into());
    }
    Ok(Expectation::Any(AnyKind::Constructor(constructor)).into())
}

/// Like [`any`], matching the constructor by name (`"Array"`, `"User"`).
pub fn any_named(name: &str) -> Result<Value, ExError> {
    if name.is_empty() {
        return Err(DeepEqError::InvalidConstructor {
            found: "empty name".to_string(),
        }
        .into());
    }
    Ok(Expectation::Any(AnyKind::Named(name.to_string())).into())
}

pub fn matches_pattern(pattern: &str) -> Result<Value, ExError> {
    let regex = Regex::new(pattern).map_err(|e| DeepEqError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Expectation::Matches(regex).into())
}

pub fn close_to(expected: f64) -> Result<Value, ExError> {
    close_to_with_precision(expected, DEFAULT_PRECISION)
}

pub fn close_to_with_precision(expected: f64, precision: u32) -> Result<Value, ExError> {
    check_finite("expected", expected)?;
    if precision > MAX_PRECISION {
        return Err(DeepEqError::InvalidPrecision {
            precision,
            max: MAX_PRECISION,
        }
        .into());
    }
    Ok(Expectation::CloseTo {
        expected,
        precision,
    }
    .into())
}

pub fn starts_with(prefix: impl Into<String>) -> Value {
    Expectation::StartsWith(prefix.into()).into()
}

/// Inclusive range.
pub fn between(min: f64, max: f64) -> Result<Value, ExError> {
    check_finite("min", min)?;
    check_finite("max", max)?;
    if min > max {
        return Err(DeepEqError::InvalidRange { min, max }.into());
    }
    Ok(Expectation::Between { min, max }.into())
}

fn check_finite(argument: &str, value: f64) -> Result<(), ExError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DeepEqError::NonFiniteNumber {
            argument: argument.to_string(),
            value,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::value::Heap;

    fn expectation(value: Value) -> std::rc::Rc<Expectation> {
        match value {
            Value::Expectation(e) => e,
            other => panic!("not an expectation: {:?}", other),
        }
    }

    #[test]
    fn test_not_uses_same_value() {
        let heap = Heap::new();
        let e = expectation(not(42));
        assert_eq!(
            e.evaluate(&heap, &Value::from(42)),
            Err(ExpectationFailure::EqualToForbidden)
        );
        assert!(e.evaluate(&heap, &Value::from(43)).is_ok());
        let zero = expectation(not(Value::Number(0.0)));
        assert!(zero.evaluate(&heap, &Value::Number(-0.0)).is_ok());
    }

    #[test]
    fn test_any_walks_delegation_chain() {
        let mut heap = Heap::new();
        let animal = heap.class("Animal");
        let dog = heap.class("Dog");
        let dog_proto = heap
            .own_value(dog.as_composite().unwrap(), "prototype")
            .unwrap();
        let animal_proto = heap
            .own_value(animal.as_composite().unwrap(), "prototype")
            .unwrap();
        heap.set_delegation_parent(&dog_proto, animal_proto).unwrap();
        let rex = heap.instance(&dog).unwrap();

        let e = expectation(any(animal).unwrap());
        assert!(e.evaluate(&heap, &rex).is_ok());
        let named = expectation(any_named("Object").unwrap());
        assert!(named.evaluate(&heap, &rex).is_ok());
        let array = expectation(any_named("Array").unwrap());
        assert_eq!(
            array.evaluate(&heap, &rex),
            Err(ExpectationFailure::NotAnInstance)
        );
    }

    #[test]
    fn test_any_primitive_wrappers() {
        let heap = Heap::new();
        let object_ctor = Value::Composite(
            heap.own_value(heap.realm().global, "Object")
                .and_then(|v| v.as_composite())
                .unwrap(),
        );
        let e = expectation(any_named("String").unwrap());
        assert!(e.evaluate(&heap, &Value::from("x")).is_ok());
        assert!(e.evaluate(&heap, &Value::Null).is_err());
        let object = expectation(any(object_ctor).unwrap());
        assert!(object.evaluate(&heap, &Value::from(1)).is_err());
    }

    #[test]
    fn test_matches_pattern() {
        let heap = Heap::new();
        let e = expectation(matches_pattern("^a+b$").unwrap());
        assert!(e.evaluate(&heap, &Value::from("aab")).is_ok());
        assert_eq!(
            e.evaluate(&heap, &Value::from("abc")),
            Err(ExpectationFailure::NoMatch)
        );
        assert_eq!(
            e.evaluate(&heap, &Value::from(1)),
            Err(ExpectationFailure::NotAString)
        );
    }

    #[test]
    fn test_invalid_pattern_is_usage_error() {
        let err = matches_pattern("(").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert_eq!(err.op(), Some("matches"));
    }

    #[test]
    fn test_close_to_tolerance() {
        let heap = Heap::new();
        let e = expectation(close_to(0.3).unwrap());
        assert!(e.evaluate(&heap, &Value::from(0.1 + 0.2)).is_ok());
        assert!(e.evaluate(&heap, &Value::from(0.304)).is_ok());
        assert_eq!(
            e.evaluate(&heap, &Value::from(0.306)),
            Err(ExpectationFailure::NotCloseEnough)
        );
        assert_eq!(
            e.evaluate(&heap, &Value::from("0.3")),
            Err(ExpectationFailure::NotANumber)
        );
        assert_eq!(
            e.evaluate(&heap, &Value::Number(f64::NAN)),
            Err(ExpectationFailure::NotANumber)
        );
    }

    #[test]
    fn test_close_to_rejects_bad_arguments() {
        assert!(close_to(f64::NAN).is_err());
        assert!(close_to_with_precision(1.0, MAX_PRECISION + 1).is_err());
        assert!(close_to_with_precision(1.0, MAX_PRECISION).is_ok());
    }

    #[test]
    fn test_starts_with() {
        let heap = Heap::new();
        let e = expectation(starts_with("hello"));
        assert!(e.evaluate(&heap, &Value::from("hello world")).is_ok());
        assert_eq!(
            e.evaluate(&heap, &Value::from("help")),
            Err(ExpectationFailure::PrefixMismatch)
        );
    }

    #[test]
    fn test_between_bounds_inclusive() {
        let heap = Heap::new();
        let e = expectation(between(100.0, 200.0).unwrap());
        assert!(e.evaluate(&heap, &Value::from(100)).is_ok());
        assert!(e.evaluate(&heap, &Value::from(200)).is_ok());
        assert_eq!(
            e.evaluate(&heap, &Value::from(50)),
            Err(ExpectationFailure::TooSmall)
        );
        assert_eq!(
            e.evaluate(&heap, &Value::from(250)),
            Err(ExpectationFailure::TooBig)
        );
        assert_eq!(
            e.evaluate(&heap, &Value::Number(f64::NAN)),
            Err(ExpectationFailure::NotANumber)
        );
    }

    #[test]
    fn test_between_rejects_inverted_range() {
        let err = between(2.0, 1.0).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert!(between(1.0, f64::INFINITY).is_err());
    }
}
