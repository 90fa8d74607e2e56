//! Tag-balance check over the raw string. This is a separate linear scan and
//! does not share the parser's tree or its closing-tag rules.

use regex::Regex;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9-]*)[^>]*>").unwrap())
}

/// True when every opened tag is closed. Empty input is not valid.
pub fn is_valid_html(html: &str) -> bool {
    !html.is_empty() && unclosed_tags(html).is_empty()
}

/// Tags still open at the end of the scan, outermost first.
///
/// `/>` tags are balanced by construction. A closing tag only closes the
/// innermost open tag of the same name (ASCII case-insensitive); any other
/// closing tag is ignored and leaves the stack as it was.
pub fn unclosed_tags(html: &str) -> Vec<String> {
    let mut stack: Vec<String> = Vec::new();

    for caps in tag_pattern().captures_iter(html) {
        let full = &caps[0];
        if full.ends_with("/>") {
            continue;
        }
        let name = caps[1].to_ascii_lowercase();
        if full.starts_with("</") {
            if stack.last() == Some(&name) {
                stack.pop();
            }
        } else {
            stack.push(name);
        }
    }

    stack
}
