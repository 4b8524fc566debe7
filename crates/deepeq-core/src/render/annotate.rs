//! Output annotation hook.
//!
//! The renderer tags every emitted fragment with a [`Channel`]. Terminal
//! front ends can colour by channel; the default leaves text untouched.

/// Role of a rendered fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Unchanged context
    Same,
    /// Present only on the actual side
    Added,
    /// Present only on the expected side
    Removed,
    /// Actual-side text of a mismatch
    ActualMismatch,
    /// Expected-side text of a mismatch
    ExpectedMismatch,
    /// Structural text (collapse lines, delimiters of unchanged parents)
    Structure,
}

pub trait Annotator {
    fn annotate(&self, text: &str, channel: Channel) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAnnotator;

impl Annotator for PlainAnnotator {
    fn annotate(&self, text: &str, _channel: Channel) -> String {
        text.to_string()
    }
}

/// Wraps fragments in ANSI colour escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiAnnotator;

impl Annotator for AnsiAnnotator {
    fn annotate(&self, text: &str, channel: Channel) -> String {
        let code = match channel {
            Channel::Same | Channel::Structure => return text.to_string(),
            Channel::Added => "32",
            Channel::Removed => "31",
            Channel::ActualMismatch => "31",
            Channel::ExpectedMismatch => "32",
        };
        if text.is_empty() {
            return String::new();
        }
        format!("\u{1b}[{}m{}\u{1b}[0m", code, text)
    }
}
