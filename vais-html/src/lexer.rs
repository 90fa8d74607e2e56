//! Cursor tokenizer. Each call to [`next_token`] reads exactly one token
//! starting at a byte offset and reports where the next one begins.

use crate::node::{Attributes, PARSE_VOID_TAGS};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Open(OpenTag),
    /// Trimmed text run, never empty.
    Text(&'a str),
    /// A run of text that was only whitespace.
    Whitespace,
    Skipped(SkipReason),
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenTag {
    /// Lower-cased tag name.
    pub name: String,
    pub attributes: Attributes,
    pub self_closing: bool,
}

/// Why a `<...>` produced no node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyTag,
    /// Closing tag outside of the element it would close. Holds the
    /// lower-cased name, empty if there was none.
    ClosingTag(String),
    /// `<!...>` or `<?...>`.
    Markup,
    InvalidTagName(String),
    /// `<` with no `>` after it, at this byte offset of the scanned input.
    /// The scan stops here.
    UnclosedDelimiter { offset: usize },
}

fn attribute_pattern() -> &'static Regex {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    ATTR.get_or_init(|| {
        Regex::new(
            r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>`]+)))?"#,
        )
        .unwrap()
    })
}

/// Read one token of `input` starting at byte `pos`.
///
/// Returns the token and the offset just past it.
pub fn next_token(input: &str, pos: usize) -> (Token<'_>, usize) {
    if pos >= input.len() {
        return (Token::End, input.len());
    }

    let rest = &input[pos..];
    if !rest.starts_with('<') {
        let end = rest.find('<').map_or(input.len(), |i| pos + i);
        let text = input[pos..end].trim();
        let token = if text.is_empty() {
            Token::Whitespace
        } else {
            Token::Text(text)
        };
        return (token, end);
    }

    let Some(close) = rest.find('>') else {
        log::trace!(target: "vais_html::lexer", "unclosed '<' at {}", pos);
        return (Token::Skipped(SkipReason::UnclosedDelimiter { offset: pos }), input.len());
    };
    let tag_end = pos + close + 1;
    let body = rest[1..close].trim();

    let token = lex_tag_body(body);
    log::trace!(target: "vais_html::lexer", "token {:?} at {}..{}", token, pos, tag_end);
    (token, tag_end)
}

fn lex_tag_body(body: &str) -> Token<'static> {
    if body.is_empty() {
        return Token::Skipped(SkipReason::EmptyTag);
    }
    if let Some(closing) = body.strip_prefix('/') {
        let name = tag_name_prefix(closing.trim_start()).to_ascii_lowercase();
        return Token::Skipped(SkipReason::ClosingTag(name));
    }
    if body.starts_with('!') || body.starts_with('?') {
        return Token::Skipped(SkipReason::Markup);
    }

    let raw_name = tag_name_prefix(body);
    if raw_name.is_empty() {
        return Token::Skipped(SkipReason::InvalidTagName(body.to_string()));
    }

    let name = raw_name.to_ascii_lowercase();
    let attributes = parse_attributes(&body[raw_name.len()..]);
    let self_closing = body.ends_with('/') || PARSE_VOID_TAGS.contains(&name.as_str());

    Token::Open(OpenTag {
        name,
        attributes,
        self_closing,
    })
}

/// Longest prefix matching `[a-zA-Z][a-zA-Z0-9-]*`, or `""`.
fn tag_name_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.first().map_or(true, |b| !b.is_ascii_alphabetic()) {
        return "";
    }
    let len = bytes
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'-'))
        .unwrap_or(bytes.len());
    &s[..len]
}

/// Permissive attribute scan: `k="v"`, `k='v'`, `k=v` and bare `k`.
/// Anything that is not an attribute is skipped over.
pub fn parse_attributes(s: &str) -> Attributes {
    let mut attributes = Attributes::new();
    for caps in attribute_pattern().captures_iter(s) {
        let key = &caps[1];
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        attributes.insert(key, value);
    }
    attributes
}
