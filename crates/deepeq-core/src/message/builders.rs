//! Specialized message builders, in priority order.

use super::{FailureSite, MessageContext};
use crate::compare::model::{
    ComparisonKind, ComparisonNode, DescriptorFlag, NodeDetail, Path, PathSegment,
    ReferenceOutcome,
};
use crate::expect::{tolerance, Expectation, ExpectationFailure};
use crate::inspect::quoted_list;
use crate::render::text::{
    excerpt, expectation_text, first_difference, format_number, key_text, quote, truncate,
    WindowOptions,
};
use crate::render::{render, RenderedDiff};
use crate::value::{CompositeRef, PropertyKey, Value};

pub(super) type Builder = fn(&MessageContext<'_>, &FailureSite<'_>) -> Option<String>;

pub(super) const SPECIALIZED: &[Builder] = &[
    combinator,
    reference,
    array_length,
    attribute_set,
    attribute_order,
    internal_keys,
    collection,
    delegation_parent,
    integrity,
    descriptor,
    string,
    coercion,
];

/// Longest expected continuation quoted in string messages.
const CONTINUATION_WIDTH: usize = 30;

pub(super) fn section(title: &str, body: &str) -> String {
    format!("--- {} ---\n{}", title, body)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

fn inspect(context: &MessageContext<'_>, value: &Value) -> String {
    context.inspector.inspect(context.adapter, value)
}

fn found_expected(found: &str, expected: &str) -> String {
    format!("{}\n{}", section("found", found), section("expected", expected))
}

// ----- Combinators -----

fn combinator(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    let ComparisonKind::Combinator(_) = node.kind else {
        return None;
    };
    let Some(NodeDetail::Expectation(failure)) = &node.detail else {
        return None;
    };
    let Some(Value::Expectation(expectation)) = &node.expected else {
        return None;
    };
    let actual = node.actual.clone().unwrap_or(Value::Undefined);
    let found = inspect(context, &actual);
    let described = expectation_text(context.adapter, expectation);

    Some(match (expectation.as_ref(), failure) {
        (Expectation::Not(_), _) => {
            format!("unexpected value\n{}", found_expected(&found, "an other value"))
        }
        (Expectation::Between { min, max }, ExpectationFailure::TooSmall) => format!(
            "{} is too small, it must be between {} and {}",
            found,
            format_number(*min),
            format_number(*max)
        ),
        (Expectation::Between { min, max }, ExpectationFailure::TooBig) => format!(
            "{} is too big, it must be between {} and {}",
            found,
            format_number(*min),
            format_number(*max)
        ),
        (Expectation::Between { min, max }, _) => format!(
            "unexpected value\n{}",
            found_expected(
                &found,
                &format!(
                    "a number between {} and {}",
                    format_number(*min),
                    format_number(*max)
                )
            )
        ),
        (
            Expectation::CloseTo {
                expected,
                precision,
            },
            ExpectationFailure::NotCloseEnough,
        ) => format!(
            "{} is not close enough to {}, it must be within {}",
            found,
            format_number(*expected),
            format_number(tolerance(*precision))
        ),
        (Expectation::CloseTo { expected, .. }, _) => format!(
            "unexpected value\n{}",
            found_expected(
                &found,
                &format!("a number close to {}", format_number(*expected))
            )
        ),
        (Expectation::Matches(regex), ExpectationFailure::NoMatch) => format!(
            "string does not match /{}/\n{}",
            regex.as_str(),
            section("found", &found)
        ),
        (Expectation::StartsWith(prefix), ExpectationFailure::PrefixMismatch) => format!(
            "string does not start with {}\n{}",
            quote(prefix),
            section("found", &found)
        ),
        (Expectation::Matches(_) | Expectation::StartsWith(_), _) => format!(
            "unexpected value\n{}",
            found_expected(&found, &format!("a string, {}", described))
        ),
        (Expectation::Any(_), _) => {
            format!("unexpected value\n{}", found_expected(&found, &described))
        }
    })
}

// ----- References -----

fn reference(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    if node.kind != ComparisonKind::Reference {
        return None;
    }
    let outcome = node.reference()?;
    let as_expected_path = |path: &Path| {
        let text = path.to_string();
        format!("expected{}", text.strip_prefix("actual").unwrap_or(&text))
    };
    let actual = node.actual.clone().unwrap_or(Value::Undefined);
    let expected = node.expected.clone().unwrap_or(Value::Undefined);
    Some(match outcome {
        ReferenceOutcome::Consistent { .. } => return None,
        ReferenceOutcome::Unexpected { actual_target } => format!(
            "unexpected reference\n{}",
            found_expected(
                &format!("reference to {}", actual_target),
                &inspect(context, &expected)
            )
        ),
        ReferenceOutcome::Missing { expected_target } => format!(
            "missing reference\n{}",
            found_expected(
                &inspect(context, &actual),
                &format!("reference to {}", as_expected_path(expected_target))
            )
        ),
        ReferenceOutcome::Diverging {
            actual_target,
            expected_target,
        } => format!(
            "unequal references\n{}",
            found_expected(
                &format!("reference to {}", actual_target),
                &format!("reference to {}", as_expected_path(expected_target))
            )
        ),
    })
}

// ----- Attribute sets -----

fn composite_pair(node: &ComparisonNode) -> Option<(CompositeRef, CompositeRef)> {
    Some((
        node.actual.as_ref()?.as_composite()?,
        node.expected.as_ref()?.as_composite()?,
    ))
}

fn array_length(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    if node.kind != ComparisonKind::AttributeSet {
        return None;
    }
    let (a, e) = composite_pair(node)?;
    if !context.adapter.shape_of(a).is_array() {
        return None;
    }
    let reasons = &node.reasons.own;
    let all_indices = reasons
        .added
        .iter()
        .chain(&reasons.removed)
        .all(|name| PropertyKey::from(name.as_str()).as_index().is_some());
    if !all_indices || (!reasons.added.is_empty() && !reasons.removed.is_empty()) {
        return None;
    }

    let length = |r: CompositeRef| {
        context
            .adapter
            .own_value(r, "length")
            .map_or_else(|| "?".to_string(), |v| inspect(context, &v))
    };
    let values = |r: CompositeRef, names: &[String]| {
        let items: Vec<String> = names
            .iter()
            .map(|name| {
                context
                    .adapter
                    .own_value(r, name)
                    .map_or_else(|| "[accessor]".to_string(), |v| inspect(context, &v))
            })
            .collect();
        format!("[{}]", items.join(", "))
    };
    let (headline, title, listed) = if reasons.added.is_empty() {
        ("an array is smaller than expected", "missing values", values(e, &reasons.removed))
    } else {
        ("an array is bigger than expected", "extra values", values(a, &reasons.added))
    };
    Some(format!(
        "{}\n{}\n{}\n{}",
        headline,
        section("array length found", &length(a)),
        section("array length expected", &length(e)),
        section(title, &listed)
    ))
}

/// Multi-line object literal of the named attributes of `composite`.
fn listed_properties(context: &MessageContext<'_>, composite: CompositeRef, names: &[String]) -> String {
    let lines: Vec<String> = names
        .iter()
        .map(|name| {
            let key = key_text(context.adapter, &PropertyKey::from(name.as_str()));
            match context.adapter.own_value(composite, name) {
                Some(value) => format!("  {}: {}", key, inspect(context, &value)),
                None => format!("  {}", key),
            }
        })
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}

fn attribute_set(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    if node.kind != ComparisonKind::AttributeSet {
        return None;
    }
    let (a, e) = composite_pair(node)?;
    let reasons = &node.reasons.own;
    let unexpected = (!reasons.added.is_empty()).then(|| {
        (
            plural(reasons.added.len(), "unexpected property", "unexpected properties"),
            section(
                if reasons.added.len() == 1 {
                    "unexpected property"
                } else {
                    "unexpected properties"
                },
                &listed_properties(context, a, &reasons.added),
            ),
        )
    });
    let missing = (!reasons.removed.is_empty()).then(|| {
        (
            plural(reasons.removed.len(), "missing property", "missing properties"),
            section(
                if reasons.removed.len() == 1 {
                    "missing property"
                } else {
                    "missing properties"
                },
                &listed_properties(context, e, &reasons.removed),
            ),
        )
    });
    Some(match (unexpected, missing) {
        (Some((head, body)), None) | (None, Some((head, body))) => format!("{}\n{}", head, body),
        (Some((head_a, body_a)), Some((head_m, body_m))) => {
            format!("{} and {}\n{}\n{}", head_a, head_m, body_a, body_m)
        }
        (None, None) => return None,
    })
}

fn order_message(node: &ComparisonNode, noun: &str) -> Option<String> {
    let Some(NodeDetail::Order { actual, expected }) = &node.detail else {
        return None;
    };
    Some(format!(
        "unexpected {} order\n{}\n{}",
        noun,
        section(&format!("{} order found", noun), &quoted_list(actual)),
        section(&format!("{} order expected", noun), &quoted_list(expected))
    ))
}

fn attribute_order(_context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    if site.node.kind != ComparisonKind::AttributeOrder {
        return None;
    }
    order_message(site.node, "properties")
}

fn internal_keys(_context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    if node.kind != ComparisonKind::InternalKeys {
        return None;
    }
    if let Some(message) = order_message(node, "internal keys") {
        return Some(message);
    }
    let reasons = &node.reasons.own;
    let mut parts = Vec::new();
    let mut sections = Vec::new();
    if !reasons.added.is_empty() {
        parts.push(plural(reasons.added.len(), "unexpected internal key", "unexpected internal keys"));
        sections.push(section("unexpected internal keys", &reasons.added.join(", ")));
    }
    if !reasons.removed.is_empty() {
        parts.push(plural(reasons.removed.len(), "missing internal key", "missing internal keys"));
        sections.push(section("missing internal keys", &reasons.removed.join(", ")));
    }
    if parts.is_empty() {
        return None;
    }
    Some(format!("{}\n{}", parts.join(" and "), sections.join("\n")))
}

// ----- Collections -----

fn collection(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    match node.kind {
        ComparisonKind::CollectionSize => {
            let found = node.actual.as_ref().map(|v| inspect(context, v))?;
            let expected = node.expected.as_ref().map(|v| inspect(context, v))?;
            let bigger = !node.reasons.own.added.is_empty();
            Some(format!(
                "{}\n{}\n{}",
                if bigger {
                    "a set is bigger than expected"
                } else {
                    "a set is smaller than expected"
                },
                section("set size found", &found),
                section("set size expected", &expected)
            ))
        }
        ComparisonKind::CollectionEntry if node.actual.is_none() || node.expected.is_none() => {
            let unexpected = node.expected.is_none();
            let siblings: Vec<&ComparisonNode> = site
                .parent()
                .map(|p| {
                    p.children
                        .iter()
                        .filter(|c| {
                            c.kind == ComparisonKind::CollectionEntry
                                && c.failed
                                && if unexpected {
                                    c.expected.is_none()
                                } else {
                                    c.actual.is_none()
                                }
                        })
                        .collect()
                })
                .unwrap_or_else(|| vec![node]);
            let lines: Vec<String> = siblings
                .iter()
                .filter_map(|c| {
                    let Some(PathSegment::MapEntry { key, .. }) = &c.segment else {
                        return None;
                    };
                    let value = if unexpected { &c.actual } else { &c.expected };
                    let value = value.as_ref().map_or_else(String::new, |v| inspect(context, v));
                    Some(format!("  {} => {}", key, value))
                })
                .collect();
            let (one, many) = if unexpected {
                ("unexpected entry", "unexpected entries")
            } else {
                ("missing entry", "missing entries")
            };
            Some(format!(
                "{}\n{}",
                plural(siblings.len(), one, many),
                section(
                    if siblings.len() == 1 { one } else { many },
                    &format!("Map {{\n{}\n}}", lines.join(",\n"))
                )
            ))
        }
        _ => None,
    }
}

// ----- Prototype, integrity, descriptors -----

/// `User.prototype` for a prototype whose constructor is named, else the
/// inspector's rendering.
fn prototype_text(context: &MessageContext<'_>, value: &Value) -> String {
    if let Some(r) = value.as_composite() {
        if context.adapter.well_known_path(r).is_none() {
            let name = context
                .adapter
                .constructor_of(r)
                .and_then(|c| c.as_composite())
                .and_then(|c| context.adapter.function_name_of(c))
                .filter(|n| !n.is_empty());
            if let Some(name) = name {
                return format!("{}.prototype", name);
            }
        }
    }
    inspect(context, value)
}

fn delegation_parent(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    if node.kind != ComparisonKind::DelegationParent || !node.self_failed {
        return None;
    }
    let actual = node.actual.as_ref()?;
    let expected = node.expected.as_ref()?;
    Some(format!(
        "unexpected prototype\n{}\n{}",
        section("prototype found", &prototype_text(context, actual)),
        section("prototype expected", &prototype_text(context, expected))
    ))
}

fn integrity(_context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    match &site.node.detail {
        Some(NodeDetail::Integrity { actual, expected }) => Some(format!(
            "unexpected object integrity\n{}",
            found_expected(actual.label(), expected.label())
        )),
        Some(NodeDetail::Extensibility { actual, expected }) => {
            let label = |extensible: bool| {
                if extensible {
                    "extensible"
                } else {
                    "non-extensible"
                }
            };
            Some(format!(
                "unexpected object extensibility\n{}",
                found_expected(label(*actual), label(*expected))
            ))
        }
        _ => None,
    }
}

fn descriptor(_context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let Some(NodeDetail::Descriptor {
        flag,
        actual,
        expected,
    }) = &site.node.detail
    else {
        return None;
    };
    let key = match &site.node.segment {
        Some(PathSegment::Descriptor { key, .. }) => quote(&key.display()),
        _ => return None,
    };
    Some(match flag {
        DescriptorFlag::Kind => {
            let kind = |accessor: bool| if accessor { "accessor" } else { "data" };
            format!(
                "unexpected property kind for {}\n{}",
                key,
                found_expected(kind(*actual), kind(*expected))
            )
        }
        _ => format!(
            "unexpected \"{}\" flag on property {}\n{}",
            flag.name(),
            key,
            found_expected(&actual.to_string(), &expected.to_string())
        ),
    })
}

// ----- Strings and patterns -----

fn string(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    let (Some(Value::String(actual)), Some(Value::String(expected))) = (&node.actual, &node.expected)
    else {
        return None;
    };
    if !node.self_failed {
        return None;
    }
    let index = first_difference(actual, expected)?;
    let window = WindowOptions {
        max_width: context.options.max_columns,
        lines_before: context.options.max_lines_before_diff,
        lines_after: context.options.max_lines_after_diff,
    };
    let shown = excerpt(actual, Some(index), window);
    let caret = format!("{}^", " ".repeat(shown.focus_column.unwrap_or(0)));
    let actual_len = actual.chars().count();
    let expected_len = expected.chars().count();
    let continuation: String = expected.chars().skip(index).collect();
    let continuation = quote(&truncate(&continuation, CONTINUATION_WIDTH));
    let unexpected_char = actual
        .chars()
        .nth(index)
        .map(|c| quote(&c.to_string()))
        .unwrap_or_default();

    let subject = if node.kind == ComparisonKind::PatternSource {
        "pattern"
    } else {
        "string"
    };
    let (headline, detail) = if index == actual_len {
        (
            format!("{} is too short", subject),
            format!("expected to continue with {}", continuation),
        )
    } else if index == expected_len {
        (
            format!("{} is too long", subject),
            format!("unexpected {}, expected to end here", unexpected_char),
        )
    } else {
        (
            format!("unexpected character in {}", subject),
            format!(
                "unexpected {}, expected to continue with {}",
                unexpected_char, continuation
            ),
        )
    };
    Some(format!(
        "{}\n{}",
        headline,
        section("details", &format!("{}\n{}\n{}", shown.text, caret, detail))
    ))
}

fn coercion(context: &MessageContext<'_>, site: &FailureSite<'_>) -> Option<String> {
    let node = site.node;
    if node.kind != ComparisonKind::CoercionResult || !node.self_failed {
        return None;
    }
    let actual = node.actual.as_ref()?;
    let expected = node.expected.as_ref()?;
    Some(format!(
        "unequal values returned by valueOf()\n{}",
        found_expected(&inspect(context, actual), &inspect(context, expected))
    ))
}

// ----- Fallback -----

/// `unequal values` with the bounded diff of the failing sub-tree.
pub(super) fn unequal_values(context: &MessageContext<'_>, site: &FailureSite<'_>) -> String {
    let RenderedDiff { actual, expected } = render(
        context.adapter,
        site.node,
        context.options,
        context.annotator,
    );
    let headline = match site.node.kind {
        ComparisonKind::DelegationParent => "unequal prototypes",
        ComparisonKind::PatternSource => "unequal patterns",
        _ => "unequal values",
    };
    format!("{}\n{}", headline, found_expected(&actual, &expected))
}
