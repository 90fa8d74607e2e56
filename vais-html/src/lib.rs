//! # VAIS HTML compiler
//!
//! Turns author-supplied HTML fragments (email blocks, rich-content cards)
//! into markup that is safe to mount and carries consistent typography.
//!
//! ## Features
//! - Pattern-based sanitizer for scripts, event handlers and embeds
//! - Lenient parser that recovers from malformed markup instead of failing
//! - Style compiler that injects inline typography for semantic tags,
//!   keeping author declarations
//! - Tag-balance validator
//! - Input size and nesting depth limits for untrusted input
//!
//! ## Example
//! ```
//! use vais_html::{compile_html, is_valid_html, sanitize};
//!
//! let html = compile_html(r#"<h1 style="color: red;">Title</h1>"#);
//! assert!(html.contains("font-size: 2.25rem"));
//! assert!(html.contains("color: red"));
//!
//! assert_eq!(sanitize("<p onclick=\"x()\">hi</p>"), "<p>hi</p>");
//! assert!(is_valid_html("<h1>Title</h1>"));
//! ```

pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod sanitizer;
pub mod style;
pub mod validator;

// --- Core types ---
pub use compiler::Compilation;
pub use config::Limits;
pub use diagnostics::Warning;
pub use error::{HtmlError, HtmlResult};
pub use node::{Attributes, Element, Node};
pub use parser::{ParseOutput, ParseResult};
pub use style::StyleRule;

/// Strip `<script>`, `<style>`, `<iframe>`, `<object>`, `<embed>` and inline
/// event handlers. Everything else is kept in place.
pub fn sanitize(input: &str) -> String {
    sanitizer::sanitize(input)
}

/// Sanitize, parse and restyle `html`. Never fails; degrades to the
/// sanitized input, or `""` for empty input.
pub fn compile_html(html: &str) -> String {
    compiler::compile_html(html)
}

/// Compile within `limits`, keeping the warnings that explain any degradation.
pub fn compile_with_report(html: &str, limits: &Limits) -> Compilation {
    compiler::compile_with_report(html, limits)
}

/// Compile within `limits`, returning an error for input that is too complex.
pub fn try_compile(html: &str, limits: &Limits) -> HtmlResult<Compilation> {
    compiler::try_compile(html, limits)
}

/// Parse into a node tree with default limits.
pub fn parse_html(html: &str) -> Vec<Node> {
    parser::parse_html(html)
}

/// Serialise nodes with semantic styles injected.
pub fn render_nodes(nodes: &[Node]) -> String {
    compiler::render_nodes(nodes)
}

/// True when every opened tag in `html` is closed.
pub fn is_valid_html(html: &str) -> bool {
    validator::is_valid_html(html)
}
