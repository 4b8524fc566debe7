//! Text primitives shared by the renderer, the inspector and the message
//! builders: number and primitive formatting, quote selection, escaping and
//! windowed string excerpts.

use crate::compare::model::is_identifier;
use crate::expect::{AnyKind, Expectation};
use crate::value::{PropertyKey, SymbolId, Value, ValueAdapter};

/// Smallest width a string excerpt is squeezed to.
pub const MIN_STRING_WIDTH: usize = 12;

const ELLIPSIS: char = '…';

/// `-0`, `NaN`, `Infinity`; integral values without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 && n.is_sign_negative() {
        "-0".to_string()
    } else {
        n.to_string()
    }
}

/// Quote that occurs least often in `s`; ties prefer `"`, then `'`.
pub fn pick_quote(s: &str) -> char {
    let count = |q: char| s.chars().filter(|c| *c == q).count();
    ['"', '\'', '`']
        .into_iter()
        .min_by_key(|q| count(*q))
        .unwrap_or('"')
}

pub fn escape_char(c: char, quote: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\\' => "\\\\".to_string(),
        c if c == quote => format!("\\{}", c),
        c if c.is_control() => format!("\\u{{{:04x}}}", c as u32),
        c => c.to_string(),
    }
}

/// Whole string, quoted and escaped.
pub fn quote(s: &str) -> String {
    let q = pick_quote(s);
    let mut out = String::with_capacity(s.len() + 2);
    out.push(q);
    for c in s.chars() {
        out.push_str(&escape_char(c, q));
    }
    out.push(q);
    out
}

/// Index (in chars) of the first position where `a` and `b` differ.
pub fn first_difference(a: &str, b: &str) -> Option<usize> {
    let mut ia = a.chars();
    let mut ib = b.chars();
    let mut i = 0;
    loop {
        match (ia.next(), ib.next()) {
            (None, None) => return None,
            (Some(x), Some(y)) if x == y => i += 1,
            _ => return Some(i),
        }
    }
}

/// Bounds for a string excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOptions {
    pub max_width: usize,
    pub lines_before: usize,
    pub lines_after: usize,
}

/// A quoted excerpt and the column of the focused character in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringExcerpt {
    pub text: String,
    /// Column (in chars) of the focus inside `text`, when there is a focus
    pub focus_column: Option<usize>,
}

/// Quote `s`, keeping only the lines around `focus` and then a column
/// window around it that fits `max_width`. Without a focus the excerpt is
/// taken from the start.
pub fn excerpt(s: &str, focus: Option<usize>, options: WindowOptions) -> StringExcerpt {
    let quote_char = pick_quote(s);
    let chars: Vec<char> = s.chars().collect();

    // 1. line window
    let (start, end) = match focus {
        Some(f) => line_window(&chars, f.min(chars.len()), options),
        None => (0, chars.len()),
    };

    // 2. escape the visible slice
    let pieces: Vec<String> = chars[start..end]
        .iter()
        .map(|c| escape_char(*c, quote_char))
        .collect();
    let focus_piece = focus.map(|f| f.clamp(start, end) - start);

    // 3. column window
    let budget = options.max_width.max(MIN_STRING_WIDTH).saturating_sub(2);
    let total: usize = pieces.iter().map(|p| p.chars().count()).sum();
    let (from, to) = if total <= budget {
        (0, pieces.len())
    } else {
        column_window(&pieces, focus_piece.unwrap_or(0), budget.saturating_sub(2))
    };

    let mut text = String::new();
    text.push(quote_char);
    if start > 0 || from > 0 {
        text.push(ELLIPSIS);
    }
    let mut focus_column = None;
    for (i, piece) in pieces.iter().enumerate().take(to).skip(from) {
        if Some(i) == focus_piece {
            focus_column = Some(text.chars().count());
        }
        text.push_str(piece);
    }
    if focus_piece == Some(to) && focus_column.is_none() {
        focus_column = Some(text.chars().count());
    }
    if end < chars.len() || to < pieces.len() {
        text.push(ELLIPSIS);
    }
    text.push(quote_char);
    StringExcerpt { text, focus_column }
}

fn line_window(chars: &[char], focus: usize, options: WindowOptions) -> (usize, usize) {
    let mut line_starts = vec![0];
    for (i, c) in chars.iter().enumerate() {
        if *c == '\n' {
            line_starts.push(i + 1);
        }
    }
    let focus_line = line_starts.iter().rposition(|s| *s <= focus).unwrap_or(0);
    let first = focus_line.saturating_sub(options.lines_before);
    let last = focus_line
        .saturating_add(options.lines_after)
        .min(line_starts.len() - 1);
    let start = line_starts[first];
    let end = line_starts.get(last + 1).map_or(chars.len(), |next| next - 1);
    (start, end.max(start))
}

/// Widest run of pieces around `focus` that fits `budget` columns, split
/// evenly on both sides when possible.
fn column_window(pieces: &[String], focus: usize, budget: usize) -> (usize, usize) {
    let width = |i: usize| pieces[i].chars().count();
    let focus = focus.min(pieces.len().saturating_sub(1));
    let mut from = focus;
    let mut to = focus;
    let mut used = 0;
    loop {
        let mut grew = false;
        if to < pieces.len() && used + width(to) <= budget {
            used += width(to);
            to += 1;
            grew = true;
        }
        if from > 0 && used + width(from - 1) <= budget {
            from -= 1;
            used += width(from);
            grew = true;
        }
        if !grew {
            break;
        }
    }
    (from, to)
}

/// Cut a single-line text to `max` chars, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

pub fn symbol_text(adapter: &dyn ValueAdapter, id: SymbolId) -> String {
    match adapter.symbol_description(id) {
        Some(d) if d.starts_with("Symbol.") => d,
        Some(d) => format!("Symbol({})", d),
        None => "Symbol()".to_string(),
    }
}

/// Attribute key as written inside an object literal.
pub fn key_text(adapter: &dyn ValueAdapter, key: &PropertyKey) -> String {
    match key {
        PropertyKey::String(name) if is_identifier(name) || key.as_index().is_some() => {
            name.clone()
        }
        PropertyKey::String(name) => quote(name),
        PropertyKey::Symbol(id) => format!("[{}]", symbol_text(adapter, *id)),
    }
}

/// One-line text of a primitive or an expectation; `None` for composites.
pub fn primitive_text(adapter: &dyn ValueAdapter, value: &Value) -> Option<String> {
    Some(match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::BigInt(n) => format!("{}n", n),
        Value::String(s) => quote(s),
        Value::Symbol(id) => symbol_text(adapter, *id),
        Value::Expectation(e) => expectation_text(adapter, e),
        Value::Composite(_) => return None,
    })
}

pub fn expectation_text(adapter: &dyn ValueAdapter, expectation: &Expectation) -> String {
    match expectation {
        Expectation::Not(v) => format!(
            "not({})",
            primitive_text(adapter, v).unwrap_or_else(|| composite_marker(adapter, v))
        ),
        Expectation::Any(AnyKind::Named(name)) => format!("any({})", name),
        Expectation::Any(AnyKind::Constructor(ctor)) => format!(
            "any({})",
            ctor.as_composite()
                .and_then(|c| adapter.function_name_of(c))
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "anonymous".to_string())
        ),
        Expectation::Matches(regex) => format!("matches(/{}/)", regex.as_str()),
        Expectation::CloseTo {
            expected,
            precision,
        } => format!("closeTo({}, {})", format_number(*expected), precision),
        Expectation::StartsWith(prefix) => format!("startsWith({})", quote(prefix)),
        Expectation::Between { min, max } => {
            format!("between({}, {})", format_number(*min), format_number(*max))
        }
    }
}

fn composite_marker(adapter: &dyn ValueAdapter, value: &Value) -> String {
    value
        .as_composite()
        .and_then(|c| adapter.well_known_path(c))
        .unwrap_or_else(|| "{...}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(width: usize) -> WindowOptions {
        WindowOptions {
            max_width: width,
            lines_before: 2,
            lines_after: 2,
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(-0.0), "-0");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_pick_quote() {
        assert_eq!(pick_quote("plain"), '"');
        assert_eq!(pick_quote("say \"hi\""), '\'');
        assert_eq!(pick_quote("it's \"x\""), '`');
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\nb"), "\"a\\nb\"");
        assert_eq!(quote("\"'`\""), "'\"\\'`\"'");
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference("hello world", "hello france"), Some(6));
        assert_eq!(first_difference("abc", "abc"), None);
        assert_eq!(first_difference("abc", "abcd"), Some(3));
    }

    #[test]
    fn test_excerpt_fits() {
        let ex = excerpt("hello world", Some(6), window(100));
        assert_eq!(ex.text, "\"hello world\"");
        assert_eq!(ex.focus_column, Some(7));
    }

    #[test]
    fn test_excerpt_windows_long_lines() {
        let long = format!("{}X{}", "a".repeat(200), "b".repeat(200));
        let ex = excerpt(&long, Some(200), window(30));
        assert!(ex.text.chars().count() <= 30, "{}", ex.text);
        assert!(ex.text.starts_with("\"…"));
        assert!(ex.text.ends_with("…\""));
        let column = ex.focus_column.unwrap();
        assert_eq!(ex.text.chars().nth(column), Some('X'));
    }

    #[test]
    fn test_excerpt_line_window() {
        let text = "l0\nl1\nl2\nl3\nl4\nl5\nl6";
        let focus = text.find("l3").unwrap();
        let ex = excerpt(text, Some(focus), window(100));
        assert_eq!(ex.text, "\"…l1\\nl2\\nl3\\nl4\\nl5…\"");
    }

    #[test]
    fn test_excerpt_unbounded_line_window() {
        let text = "l0\nl1\nl2\nl3\nl4\nl5\nl6";
        let focus = text.find("l3").unwrap();
        let options = WindowOptions {
            max_width: 100,
            lines_before: usize::MAX,
            lines_after: usize::MAX,
        };
        let ex = excerpt(text, Some(focus), options);
        assert_eq!(ex.text, "\"l0\\nl1\\nl2\\nl3\\nl4\\nl5\\nl6\"");
    }

    #[test]
    fn test_excerpt_focus_past_end() {
        let ex = excerpt("abc", Some(3), window(100));
        assert_eq!(ex.text, "\"abc\"");
        assert_eq!(ex.focus_column, Some(4));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 10), "abcdef");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
