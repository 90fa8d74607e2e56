use std::collections::HashMap;
use std::sync::OnceLock;

/// Default typography for a semantic tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule {
    pub font_size: &'static str,
    pub font_weight: &'static str,
    pub margin: &'static str,
    pub line_height: &'static str,
}

impl StyleRule {
    const fn new(
        font_size: &'static str,
        font_weight: &'static str,
        margin: &'static str,
        line_height: &'static str,
    ) -> Self {
        Self {
            font_size,
            font_weight,
            margin,
            line_height,
        }
    }

    /// The four base declarations, in emission order.
    pub fn declarations(&self) -> [(&'static str, &'static str); 4] {
        [
            ("font-size", self.font_size),
            ("font-weight", self.font_weight),
            ("margin", self.margin),
            ("line-height", self.line_height),
        ]
    }
}

const DIV_RULE: StyleRule = StyleRule::new("1rem", "400", "0", "1.5");

const RULES: &[(&str, StyleRule)] = &[
    ("h1", StyleRule::new("2.25rem", "700", "0 0 1rem 0", "2.5rem")),
    ("h2", StyleRule::new("1.875rem", "700", "0 0 0.875rem 0", "2.25rem")),
    ("h3", StyleRule::new("1.5rem", "600", "0 0 0.75rem 0", "2rem")),
    ("h4", StyleRule::new("1.25rem", "600", "0 0 0.625rem 0", "1.75rem")),
    ("h5", StyleRule::new("1.125rem", "600", "0 0 0.5rem 0", "1.75rem")),
    ("h6", StyleRule::new("1rem", "600", "0 0 0.5rem 0", "1.5rem")),
    ("p", StyleRule::new("1rem", "400", "0 0 1rem 0", "1.75")),
    ("div", DIV_RULE),
    ("span", StyleRule::new("inherit", "inherit", "0", "inherit")),
    ("strong", StyleRule::new("inherit", "700", "0", "inherit")),
    ("b", StyleRule::new("inherit", "700", "0", "inherit")),
    ("em", StyleRule::new("inherit", "inherit", "0", "inherit")),
    ("i", StyleRule::new("inherit", "inherit", "0", "inherit")),
    ("u", StyleRule::new("inherit", "inherit", "0", "inherit")),
    ("small", StyleRule::new("0.875rem", "400", "0", "1.25rem")),
    ("a", StyleRule::new("inherit", "500", "0", "inherit")),
    ("blockquote", StyleRule::new("1.125rem", "400", "1rem 0", "1.75")),
    ("li", StyleRule::new("1rem", "400", "0 0 0.25rem 0", "1.75")),
    ("code", StyleRule::new("0.875rem", "500", "0", "1.5")),
];

fn style_table() -> &'static HashMap<&'static str, StyleRule> {
    static TABLE: OnceLock<HashMap<&'static str, StyleRule>> = OnceLock::new();
    TABLE.get_or_init(|| RULES.iter().copied().collect())
}

/// Rule for `tag`, falling back to the `div` rule for tags without one.
pub fn rule_for(tag: &str) -> &'static StyleRule {
    style_table().get(tag).unwrap_or(&DIV_RULE)
}

pub fn is_known_tag(tag: &str) -> bool {
    style_table().contains_key(tag)
}
