use crate::config::Limits;
use crate::diagnostics::Warning;
use crate::error::{HtmlError, HtmlResult};
use crate::lexer::{self, OpenTag, SkipReason, Token};
use crate::node::{Element, Node};
use std::collections::HashMap;

/// Outcome of one step of the tree builder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Node(Node),
    Skipped(SkipReason),
}

impl ParseResult {
    pub fn into_node(self) -> Option<Node> {
        match self {
            ParseResult::Node(node) => Some(node),
            ParseResult::Skipped(_) => None,
        }
    }
}

/// Parsed top-level nodes plus everything that was recovered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub nodes: Vec<Node>,
    pub warnings: Vec<Warning>,
}

// ─── Public parse functions ──────────────────────────────────────────────────

/// Lenient parse with default limits. Never fails; a limit violation gives
/// an empty vector.
pub fn parse_html(html: &str) -> Vec<Node> {
    match parse_with_limits(html, &Limits::default()) {
        Ok(output) => output.nodes,
        Err(err) => {
            log::debug!("parse_html: {}", err);
            Vec::new()
        }
    }
}

/// Parse `html` within `limits`, collecting recoverable warnings.
pub fn parse_with_limits(html: &str, limits: &Limits) -> HtmlResult<ParseOutput> {
    let mut builder = TreeBuilder::new(limits);
    let results = builder.run(html)?;
    Ok(ParseOutput {
        nodes: results.into_iter().filter_map(ParseResult::into_node).collect(),
        warnings: builder.warnings,
    })
}

/// Top-level parse steps, including the skipped ones, in input order.
pub fn parse_results(html: &str, limits: &Limits) -> HtmlResult<Vec<ParseResult>> {
    TreeBuilder::new(limits).run(html)
}

// ─── Closing tag index ───────────────────────────────────────────────────────

/// Start offsets of every literal `</name>` in a document, grouped by the
/// name exactly as written. Offsets are ascending within each group.
#[derive(Debug, Default)]
struct ClosingTagIndex<'a> {
    positions: HashMap<&'a str, Vec<usize>>,
}

impl<'a> ClosingTagIndex<'a> {
    fn build(html: &'a str) -> Self {
        let bytes = html.as_bytes();
        let mut positions: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut from = 0;
        while let Some(rel) = html[from..].find("</") {
            let start = from + rel;
            let name_start = start + 2;
            let name_len = bytes[name_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
                .count();
            let name_end = name_start + name_len;
            if name_len > 0 && bytes.get(name_end) == Some(&b'>') {
                positions
                    .entry(&html[name_start..name_end])
                    .or_default()
                    .push(start);
            }
            from = name_start;
        }
        Self { positions }
    }

    /// First `</name>` that starts at or after `from` and ends by `end`.
    fn find(&self, name: &str, from: usize, end: usize) -> Option<usize> {
        let starts = self.positions.get(name)?;
        let first = starts[starts.partition_point(|&p| p < from)..].first()?;
        // `</`, the name, `>`
        (first + name.len() + 3 <= end).then_some(*first)
    }
}

// ─── Tree builder ────────────────────────────────────────────────────────────

struct TreeBuilder<'a> {
    limits: &'a Limits,
    closers: ClosingTagIndex<'a>,
    warnings: Vec<Warning>,
}

impl<'a> TreeBuilder<'a> {
    fn new(limits: &'a Limits) -> Self {
        Self {
            limits,
            closers: ClosingTagIndex::default(),
            warnings: Vec::new(),
        }
    }

    fn run(&mut self, html: &'a str) -> HtmlResult<Vec<ParseResult>> {
        let trimmed = html.trim();
        if trimmed.len() > self.limits.max_input_len {
            log::warn!(
                "rejecting {} byte input (limit {})",
                trimmed.len(),
                self.limits.max_input_len
            );
            return Err(HtmlError::InputTooLarge {
                len: trimmed.len(),
                max: self.limits.max_input_len,
            });
        }
        self.closers = ClosingTagIndex::build(html);
        let base = html.len() - html.trim_start().len();
        self.parse_fragment(trimmed, base, 1)
    }

    /// Parse one fragment. `base` is the fragment's byte offset in the
    /// original input and `depth` the depth its elements will sit at.
    /// Closers are looked up in absolute offsets, so `input` must be the
    /// slice of the original input starting at `base`.
    fn parse_fragment(
        &mut self,
        input: &str,
        base: usize,
        depth: usize,
    ) -> HtmlResult<Vec<ParseResult>> {
        let mut results = Vec::new();
        let mut pos = 0;

        loop {
            let (token, next) = lexer::next_token(input, pos);
            let result = match token {
                Token::End => break,
                Token::Whitespace => {
                    pos = next;
                    continue;
                }
                Token::Text(text) => {
                    pos = next;
                    ParseResult::Node(Node::text(text))
                }
                Token::Skipped(reason) => {
                    pos = next;
                    let reason = match reason {
                        SkipReason::UnclosedDelimiter { offset } => {
                            SkipReason::UnclosedDelimiter {
                                offset: base + offset,
                            }
                        }
                        other => other,
                    };
                    self.warn_skipped(&reason);
                    ParseResult::Skipped(reason)
                }
                Token::Open(tag) => {
                    let (element, after) = self.build_element(input, base, tag, next, depth)?;
                    pos = after;
                    ParseResult::Node(Node::Element(element))
                }
            };
            results.push(result);
        }

        Ok(results)
    }

    /// Build the element whose open tag ends at `open_end`, returning it and
    /// the offset where scanning resumes.
    fn build_element(
        &mut self,
        input: &str,
        base: usize,
        tag: OpenTag,
        open_end: usize,
        depth: usize,
    ) -> HtmlResult<(Element, usize)> {
        if depth > self.limits.max_depth {
            log::warn!("nesting depth {} exceeds {}", depth, self.limits.max_depth);
            return Err(HtmlError::MaxNestingDepthExceeded {
                max_depth: self.limits.max_depth,
            });
        }

        let mut element = Element::new(tag.name);
        element.attributes = tag.attributes;
        if tag.self_closing {
            return Ok((element, open_end));
        }

        // Literal, case-sensitive match on the lower-cased closer: `<H1>`
        // is only closed by `</h1>`.
        let closer_len = element.tag.len() + 3;
        let found = self
            .closers
            .find(&element.tag, base + open_end, base + input.len());
        match found {
            Some(at) => {
                let rel = at - base - open_end;
                let inner = &input[open_end..open_end + rel];
                let inner_base = base + open_end + (inner.len() - inner.trim_start().len());
                element.children = self
                    .parse_fragment(inner.trim(), inner_base, depth + 1)?
                    .into_iter()
                    .filter_map(ParseResult::into_node)
                    .collect();
                Ok((element, open_end + rel + closer_len))
            }
            None => {
                log::debug!("no </{0}> found, <{0}> left childless", element.tag);
                self.warnings.push(Warning::UnterminatedElement {
                    tag: element.tag.clone(),
                });
                Ok((element, open_end))
            }
        }
    }

    fn warn_skipped(&mut self, reason: &SkipReason) {
        let warning = match reason {
            SkipReason::EmptyTag => Warning::EmptyTag,
            SkipReason::ClosingTag(tag) => Warning::StrayClosingTag { tag: tag.clone() },
            SkipReason::Markup => Warning::SkippedMarkup,
            SkipReason::InvalidTagName(raw) => Warning::InvalidTagName { raw: raw.clone() },
            SkipReason::UnclosedDelimiter { offset } => {
                Warning::UnclosedDelimiter { offset: *offset }
            }
        };
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        node.as_element().expect("expected element")
    }

    #[test]
    fn test_parse_simple_element() {
        let nodes = parse_html("<h1>Title</h1>");
        assert_eq!(nodes.len(), 1);
        let h1 = element(&nodes[0]);
        assert_eq!(h1.tag, "h1");
        assert_eq!(h1.children, vec![Node::text("Title")]);
    }

    #[test]
    fn test_parse_nested_with_text_siblings() {
        let nodes = parse_html("<p>Title with <strong>bold</strong> text</p>");
        let p = element(&nodes[0]);
        assert_eq!(p.children.len(), 3);
        assert_eq!(p.children[0], Node::text("Title with"));
        assert_eq!(element(&p.children[1]).tag, "strong");
        assert_eq!(p.children[2], Node::text("text"));
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(parse_html("").is_empty());
        assert!(parse_html("   \n\t").is_empty());
    }

    #[test]
    fn test_void_and_self_closing_have_no_children() {
        let nodes = parse_html(r#"<img src="a.png">after<x-icon/>"#);
        assert_eq!(nodes.len(), 3);
        assert_eq!(element(&nodes[0]).attributes.get("src"), Some("a.png"));
        assert!(element(&nodes[0]).children.is_empty());
        assert_eq!(nodes[1], Node::text("after"));
        assert_eq!(element(&nodes[2]).tag, "x-icon");
    }

    #[test]
    fn test_unterminated_element_content_becomes_siblings() {
        let output = parse_with_limits("<h1>Unclosed tag", &Limits::default()).unwrap();
        assert_eq!(output.nodes.len(), 2);
        assert!(element(&output.nodes[0]).children.is_empty());
        assert_eq!(output.nodes[1], Node::text("Unclosed tag"));
        assert_eq!(
            output.warnings,
            vec![Warning::UnterminatedElement {
                tag: "h1".to_string()
            }]
        );
    }

    #[test]
    fn test_uppercase_closer_is_not_matched() {
        // The closer search uses the lower-cased name, so `</H1>` never closes `<H1>`.
        let nodes = parse_html("<H1>Title</H1>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(element(&nodes[0]).tag, "h1");
        assert!(element(&nodes[0]).children.is_empty());
        assert_eq!(nodes[1], Node::text("Title"));

        let nodes = parse_html("<H1>Title</h1>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(element(&nodes[0]).children, vec![Node::text("Title")]);
    }

    #[test]
    fn test_nested_same_tag_closes_at_first_closer() {
        let output = parse_with_limits("<div><div>a</div></div>", &Limits::default()).unwrap();
        assert_eq!(output.nodes.len(), 1);
        let outer = element(&output.nodes[0]);
        // The inner <div> never sees its closer; the outer one took it.
        assert_eq!(outer.children.len(), 2);
        assert!(element(&outer.children[0]).children.is_empty());
        assert_eq!(outer.children[1], Node::text("a"));
        assert!(output.warnings.contains(&Warning::StrayClosingTag {
            tag: "div".to_string()
        }));
    }

    #[test]
    fn test_skipped_tokens_are_reported() {
        let results =
            parse_results("<!-- note --><><p>x</p></span><9>", &Limits::default()).unwrap();
        assert_eq!(
            results,
            vec![
                ParseResult::Skipped(SkipReason::Markup),
                ParseResult::Skipped(SkipReason::EmptyTag),
                ParseResult::Node(Node::Element(
                    Element::new("p").with_child(Node::text("x"))
                )),
                ParseResult::Skipped(SkipReason::ClosingTag("span".to_string())),
                ParseResult::Skipped(SkipReason::InvalidTagName("9".to_string())),
            ]
        );
    }

    #[test]
    fn test_unclosed_delimiter_drops_remainder() {
        let output = parse_with_limits("  <p>ok</p> tail <b class=", &Limits::default()).unwrap();
        assert_eq!(output.nodes.len(), 2);
        assert_eq!(output.nodes[1], Node::text("tail"));
        assert_eq!(
            output.warnings,
            vec![Warning::UnclosedDelimiter { offset: 17 }]
        );
    }

    #[test]
    fn test_unclosed_delimiter_offset_inside_child() {
        let output = parse_with_limits("<p> a <b</p>", &Limits::default()).unwrap();
        // The child fragment is cut at `</p>`, so `<b` never reaches a `>`.
        assert_eq!(
            output.warnings,
            vec![Warning::UnclosedDelimiter { offset: 6 }]
        );
        let p = element(&output.nodes[0]);
        assert_eq!(p.children, vec![Node::text("a")]);
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits::new(1024, 2);
        assert!(parse_with_limits("<div><p>ok</p></div>", &limits).is_ok());
        let result = parse_with_limits("<div><p><b>deep</b></p></div>", &limits);
        assert_eq!(
            result,
            Err(HtmlError::MaxNestingDepthExceeded { max_depth: 2 })
        );
    }

    #[test]
    fn test_input_length_limit() {
        let result = parse_with_limits("  <p>0123456789</p>  ", &Limits::new(8, 4));
        assert_eq!(result, Err(HtmlError::InputTooLarge { len: 17, max: 8 }));
    }

    #[test]
    fn test_lenient_parse_swallows_limit_errors() {
        let open: String = (0..300).map(|i| format!("<x{}>", i)).collect();
        let close: String = (0..300).rev().map(|i| format!("</x{}>", i)).collect();
        let deep = open + "core" + &close;
        assert!(parse_html(&deep).is_empty());
    }

    #[test]
    fn test_closing_tag_index_positions() {
        let html = "<p>a</p> </P> </p-x> </ p> <p></p>";
        let index = ClosingTagIndex::build(html);
        assert_eq!(index.positions.get("p"), Some(&vec![4, 30]));
        assert_eq!(index.positions.get("P"), Some(&vec![9]));
        assert_eq!(index.positions.get("p-x"), Some(&vec![14]));
        assert_eq!(index.find("p", 5, html.len()), Some(30));
        // A closer that runs past the fragment end does not count.
        assert_eq!(index.find("p", 5, 33), None);
        assert_eq!(index.find("div", 0, html.len()), None);
    }

    #[test]
    fn test_closer_lookup_stays_inside_fragment() {
        // The inner <b> must not borrow the `</b>` that follows its parent.
        let output = parse_with_limits("<i><b>x</i></b>", &Limits::default()).unwrap();
        let i = element(&output.nodes[0]);
        assert_eq!(i.children.len(), 2);
        assert!(element(&i.children[0]).children.is_empty());
        assert_eq!(i.children[1], Node::text("x"));
        assert!(output.warnings.contains(&Warning::UnterminatedElement {
            tag: "b".to_string()
        }));
    }

    #[test]
    fn test_many_unterminated_tags_parse_in_linear_time() {
        let html = "<a>".repeat(100_000);
        let started = std::time::Instant::now();
        let output = parse_with_limits(&html, &Limits::default()).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert_eq!(output.nodes.len(), 100_000);
        assert_eq!(output.warnings.len(), 100_000);
    }

    #[test]
    fn test_attribute_keys_lowercased() {
        let nodes = parse_html(r#"<div DATA-Test-Attr="Value">x</div>"#);
        assert_eq!(
            element(&nodes[0]).attributes.iter().collect::<Vec<_>>(),
            vec![("data-test-attr", "Value")]
        );
    }
}
