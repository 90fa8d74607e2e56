//! Re-serialises a parse tree with canonical inline typography for semantic
//! tags, and the `compile_html` pipeline built on top of it.

use crate::config::Limits;
use crate::diagnostics::Warning;
use crate::error::{HtmlError, HtmlResult};
use crate::node::{Element, Node};
use crate::parser;
use crate::sanitizer::{contains_dangerous_markup, sanitize};
use crate::style;

/// Output of a compile plus the recoverable conditions behind it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    pub html: String,
    pub warnings: Vec<Warning>,
}

impl Compilation {
    /// True when the parse tree was abandoned for the sanitized input.
    pub fn is_degraded(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, Warning::SanitizeFallback { .. }))
    }

    fn fallback(sanitized: String, reason: &str, mut warnings: Vec<Warning>) -> Self {
        log::debug!("compile fell back to sanitized input: {}", reason);
        warnings.push(Warning::SanitizeFallback {
            reason: reason.to_string(),
        });
        Self {
            html: sanitized,
            warnings,
        }
    }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Sanitize, parse and restyle `html`. Never fails: anything that stops the
/// styled path yields the sanitized input instead, and empty input yields `""`.
pub fn compile_html(html: &str) -> String {
    compile_with_report(html, &Limits::default()).html
}

/// Like [`compile_html`], keeping the warnings.
pub fn compile_with_report(html: &str, limits: &Limits) -> Compilation {
    match try_compile(html, limits) {
        Ok(compilation) => compilation,
        Err(err) => Compilation::fallback(sanitize(html.trim()), &err.to_string(), Vec::new()),
    }
}

/// Like [`compile_with_report`], but an input that breaks `limits` is
/// returned as an error instead of degrading.
pub fn try_compile(html: &str, limits: &Limits) -> HtmlResult<Compilation> {
    let trimmed = html.trim();
    if trimmed.is_empty() {
        return Ok(Compilation::default());
    }
    if trimmed.len() > limits.max_input_len {
        return Err(HtmlError::InputTooLarge {
            len: trimmed.len(),
            max: limits.max_input_len,
        });
    }

    let sanitized = sanitize(trimmed);
    let parsed = parser::parse_with_limits(&sanitized, limits)?;
    let mut warnings = parsed.warnings;

    if parsed.nodes.is_empty() {
        return Ok(Compilation::fallback(sanitized, "no nodes parsed", warnings));
    }

    let mut renderer = Renderer::default();
    let rendered = renderer.render(&parsed.nodes);
    warnings.append(&mut renderer.warnings);

    if rendered.is_empty() {
        return Ok(Compilation::fallback(sanitized, "empty render", warnings));
    }

    Ok(Compilation {
        html: ensure_clean(rendered, &mut warnings),
        warnings,
    })
}

/// Run the sanitizer again over `rendered` if any of its patterns still match.
fn ensure_clean(rendered: String, warnings: &mut Vec<Warning>) -> String {
    if !contains_dangerous_markup(&rendered) {
        return rendered;
    }
    log::warn!("rendered output matched a sanitizer pattern, sanitizing again");
    warnings.push(Warning::Resanitized);
    sanitize(&rendered)
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Serialise `nodes` with semantic styles injected.
pub fn render_nodes(nodes: &[Node]) -> String {
    Renderer::default().render(nodes)
}

#[derive(Debug, Default)]
struct Renderer {
    warnings: Vec<Warning>,
}

impl Renderer {
    fn render(&mut self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.render_node(node, &mut out);
        }
        out
    }

    fn render_node(&mut self, node: &Node, out: &mut String) {
        match node {
            // Verbatim: the input has already been sanitized.
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => self.render_element(element, out),
        }
    }

    fn render_element(&mut self, element: &Element, out: &mut String) {
        if !style::is_known_tag(&element.tag) {
            self.warnings.push(Warning::UnknownTag {
                tag: element.tag.clone(),
            });
        }

        out.push('<');
        out.push_str(&element.tag);
        out.push_str(" style=\"");
        out.push_str(&escape_quotes(&merged_style(
            &element.tag,
            element.attributes.get("style"),
        )));
        out.push('"');

        for (key, value) in element.attributes.iter().filter(|(k, _)| *k != "style") {
            if is_event_handler(key) {
                self.warnings.push(Warning::DroppedEventHandler {
                    attribute: key.to_string(),
                });
                continue;
            }
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_quotes(value));
            out.push('"');
        }

        if element.is_render_void() {
            out.push_str(" />");
            return;
        }

        out.push('>');
        if element.children.is_empty() {
            out.push_str(element.attributes.get("alt").unwrap_or(""));
        } else {
            for child in &element.children {
                self.render_node(child, out);
            }
        }
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }
}

/// Base declarations for `tag` with the author's `style` overlaid.
///
/// Author values replace base values in place; author-only properties are
/// appended in the order written.
pub fn merged_style(tag: &str, author: Option<&str>) -> String {
    let mut declarations: Vec<(String, String)> = style::rule_for(tag)
        .declarations()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for (key, value) in author.map(parse_style_attribute).unwrap_or_default() {
        match declarations.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => declarations.push((key, value)),
        }
    }

    declarations
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Split `"a: b; c: d"` into lower-cased property names and trimmed values.
/// Entries without a `:`, a name or a value are dropped.
pub fn parse_style_attribute(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

/// Attribute names are lower-cased by [`crate::node::Attributes`].
fn is_event_handler(key: &str) -> bool {
    key.starts_with("on")
}

fn escape_quotes(value: &str) -> String {
    value.replace('"', "&quot;")
}
