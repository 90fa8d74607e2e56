//! Pattern-based removal of executable and embedding markup.
//!
//! This pass does not build a tree. It strips whole `<script>`, `<style>`,
//! `<iframe>` and `<object>` blocks, `<embed>` openers and inline `on*`
//! event-handler attributes, and leaves every other byte where it was.

use regex::{Captures, Regex, Replacer};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Upper bound on fixpoint rounds. Every productive round shrinks the input,
/// so this is only reached by adversarial nesting like `<scr<script></script>ipt>`.
const MAX_ROUNDS: usize = 16;

fn block_patterns() -> &'static [Regex] {
    static BLOCKS: OnceLock<Vec<Regex>> = OnceLock::new();
    BLOCKS.get_or_init(|| {
        ["script", "style", "iframe", "object"]
            .iter()
            .map(|tag| Regex::new(&format!(r"(?is)<{0}[\s/>].*?</{0}\s*>", tag)).unwrap())
            .collect()
    })
}

/// Openers left behind without a closing tag. The name must end at
/// whitespace, `/`, `>` or the end of input, so `<style-box>` is not one.
fn dangling_opener_pattern() -> &'static Regex {
    static DANGLING: OnceLock<Regex> = OnceLock::new();
    DANGLING.get_or_init(|| {
        Regex::new(r"(?i)<(?:script|style|iframe|object)(?:>|[\s/][^>]*>?|$)").unwrap()
    })
}

fn embed_pattern() -> &'static Regex {
    static EMBED: OnceLock<Regex> = OnceLock::new();
    EMBED.get_or_init(|| Regex::new(r"(?i)<embed(?:>|[\s/][^>]*>?|$)").unwrap())
}

/// `on<word>=value` preceded by anything but a word character or `-`.
/// Group 1 holds that preceding character so it can be put back.
fn event_handler_pattern() -> &'static Regex {
    static HANDLER: OnceLock<Regex> = OnceLock::new();
    HANDLER.get_or_init(|| {
        Regex::new(r#"(?i)(^|[^\w-])on\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
    })
}

/// Keeps a quote or other glue character before a removed handler, drops a
/// separating space or `/`.
fn handler_replacement(caps: &Captures<'_>) -> String {
    let prefix = &caps[1];
    if prefix.chars().all(|c| c.is_whitespace() || c == '/') {
        String::new()
    } else {
        prefix.to_string()
    }
}

/// Strip dangerous constructs from `input` and trim the result.
///
/// Empty input gives an empty string.
pub fn sanitize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut current = input.to_string();
    for round in 0..MAX_ROUNDS {
        if !contains_dangerous_markup(&current) {
            break;
        }
        let next = sanitize_once(&current);
        if next == current {
            break;
        }
        log::trace!(
            target: "vais_html::sanitizer",
            "round {} removed {} bytes",
            round,
            current.len().saturating_sub(next.len())
        );
        current = next;
    }
    current.trim().to_string()
}

fn sanitize_once(input: &str) -> String {
    let mut out: Cow<'_, str> = Cow::Borrowed(input);
    for re in block_patterns() {
        out = replace(out, re, "");
    }
    out = replace(out, dangling_opener_pattern(), "");
    out = replace(out, embed_pattern(), "");
    out = replace(out, event_handler_pattern(), handler_replacement);
    out.into_owned()
}

fn replace<'a, R: Replacer>(text: Cow<'a, str>, re: &Regex, rep: R) -> Cow<'a, str> {
    let replaced = match re.replace_all(&text, rep) {
        Cow::Borrowed(_) => None,
        Cow::Owned(s) => Some(s),
    };
    match replaced {
        Some(s) => Cow::Owned(s),
        None => text,
    }
}

/// True when `input` still contains anything [`sanitize`] would remove.
pub fn contains_dangerous_markup(input: &str) -> bool {
    block_patterns().iter().any(|re| re.is_match(input))
        || dangling_opener_pattern().is_match(input)
        || embed_pattern().is_match(input)
        || event_handler_pattern().is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn test_removes_script_block_any_case() {
        let out = sanitize("<p>a</p><SCRIPT type=\"text/javascript\">if (1 < 2) alert(1)</ScRiPt><p>b</p>");
        assert_eq!(out, "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_removes_multiline_script_lazily() {
        let html = "<script>\nlet a = '<b>';\n</script><b>keep</b><script>x()</script>";
        assert_eq!(sanitize(html), "<b>keep</b>");
    }

    #[test]
    fn test_removes_event_handlers() {
        assert_eq!(
            sanitize(r#"<img src="a.png" onerror="alert(1)">"#),
            r#"<img src="a.png">"#
        );
        assert_eq!(
            sanitize("<div onclick='go()' class=\"x\">t</div>"),
            "<div class=\"x\">t</div>"
        );
        assert_eq!(sanitize("<a ONMOUSEOVER=steal()>x</a>"), "<a>x</a>");
    }

    #[test]
    fn test_removes_slash_separated_handler() {
        assert_eq!(sanitize("<img/onerror=alert(1)>"), "<img>");
    }

    #[test]
    fn test_removes_style_iframe_object_embed() {
        let html = concat!(
            "<style>body{}</style>",
            "<iframe src=\"https://evil\"></iframe>",
            "<object data=\"x.swf\"><param name=\"a\"></object>",
            "<embed src=\"x.swf\" type=\"application/x-shockwave-flash\">",
            "<p>safe</p>"
        );
        assert_eq!(sanitize(html), "<p>safe</p>");
    }

    #[test]
    fn test_reassembled_script_is_removed() {
        let out = sanitize("<scr<script>x</script>ipt>alert(1)</script>");
        assert!(!out.to_lowercase().contains("<script"));
    }

    #[test]
    fn test_dangling_script_opener_removed() {
        let out = sanitize("<p>hi</p><script>alert(1)");
        assert_eq!(out, "<p>hi</p>alert(1)");
    }

    #[test]
    fn test_leaves_custom_markup_untouched() {
        let html = r#"<my-widget data-on="1" title="x">content</my-widget>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_removes_handler_glued_to_previous_attribute() {
        assert_eq!(
            sanitize(r#"<img src="x.png"onerror="alert(1)">"#),
            r#"<img src="x.png">"#
        );
        assert_eq!(
            sanitize(r#"<img src=x x"onerror=alert(1)>"#),
            r#"<img src=x x">"#
        );
        assert_eq!(
            sanitize(r#"<b title='t'onclick='a()'onmouseover='b()'>x</b>"#),
            "<b title='t''>x</b>"
        );
    }

    #[test]
    fn test_leaves_custom_tags_sharing_a_blocked_prefix() {
        let html = "<style-box>hi</style-box><object-card>x</object-card><embed-frame>y</embed-frame>";
        assert_eq!(sanitize(html), html);
        assert_eq!(
            sanitize("<script-list>a</script-list><iframe-x/>"),
            "<script-list>a</script-list><iframe-x/>"
        );
    }

    #[test]
    fn test_blocked_tags_end_at_space_slash_or_end() {
        assert_eq!(sanitize("<p>a</p><embed/src=x.swf>"), "<p>a</p>");
        assert_eq!(sanitize("<p>a</p><iframe"), "<p>a</p>");
        assert_eq!(sanitize("<style\n>b{}</style><p>a</p>"), "<p>a</p>");
    }

    #[test]
    fn test_result_is_trimmed() {
        assert_eq!(sanitize("  <p>x</p>\n"), "<p>x</p>");
    }

    #[test]
    fn test_contains_dangerous_markup() {
        assert!(contains_dangerous_markup("<embed src=x>"));
        assert!(contains_dangerous_markup(r#"<b onclick="x">"#));
        assert!(contains_dangerous_markup(r#"<b id="a"onclick="x">"#));
        assert!(!contains_dangerous_markup("<b>bold</b>"));
        assert!(!contains_dangerous_markup(r#"<style-box data-on="1">"#));
    }
}
