use serde::{Deserialize, Serialize};
use std::fmt;

/// A recoverable condition hit while compiling. None of these stop the
/// pipeline; they explain why the output may be less styled than expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// No `</tag>` was found; the element was kept without children.
    UnterminatedElement { tag: String },
    /// The tag has no style rule of its own and used the `div` rule.
    UnknownTag { tag: String },
    /// A closing tag with no open element to close.
    StrayClosingTag { tag: String },
    /// Comment, doctype or processing instruction.
    SkippedMarkup,
    /// `<>` or a tag body of only whitespace.
    EmptyTag,
    InvalidTagName { raw: String },
    /// A `<` with no `>` after it. Everything from `offset` on was dropped.
    UnclosedDelimiter { offset: usize },
    /// The parse tree could not be used and the sanitized input was returned.
    SanitizeFallback { reason: String },
    /// An `on*` attribute reached the renderer and was left out.
    DroppedEventHandler { attribute: String },
    /// Rendered output matched a sanitizer pattern and was sanitized again.
    Resanitized,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnterminatedElement { tag } => {
                write!(f, "element <{}> has no closing tag", tag)
            }
            Warning::UnknownTag { tag } => {
                write!(f, "no style rule for <{}>, using the div rule", tag)
            }
            Warning::StrayClosingTag { tag } => write!(f, "ignored stray closing tag </{}>", tag),
            Warning::SkippedMarkup => write!(f, "skipped comment, doctype or processing instruction"),
            Warning::EmptyTag => write!(f, "skipped empty tag"),
            Warning::InvalidTagName { raw } => write!(f, "skipped tag with invalid name '{}'", raw),
            Warning::UnclosedDelimiter { offset } => {
                write!(f, "unclosed '<' at byte {}, rest of input dropped", offset)
            }
            Warning::SanitizeFallback { reason } => {
                write!(f, "fell back to sanitized input: {}", reason)
            }
            Warning::DroppedEventHandler { attribute } => {
                write!(f, "dropped event handler attribute '{}'", attribute)
            }
            Warning::Resanitized => write!(f, "rendered output was sanitized again"),
        }
    }
}
