use crate::error::{HtmlError, HtmlResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_INPUT_LEN: usize = 1024 * 1024;
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Bounds applied before and during parsing of untrusted markup.
///
/// ```yaml
/// maxInputLen: 65536
/// maxDepth: 64
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Limits {
    /// Maximum input size in bytes, measured after trimming.
    pub max_input_len: usize,
    /// Maximum element nesting depth. Top-level elements are depth 1.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Limits {
    pub fn new(max_input_len: usize, max_depth: usize) -> Self {
        Self {
            max_input_len,
            max_depth,
        }
    }

    /// Parse limits from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> HtmlResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let limits: Limits = serde_yaml::from_str(yaml)?;
        limits.check()?;
        Ok(limits)
    }

    pub fn from_file(path: impl AsRef<Path>) -> HtmlResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    fn check(&self) -> HtmlResult<()> {
        if self.max_depth == 0 {
            return Err(HtmlError::Config("maxDepth must be at least 1".to_string()));
        }
        if self.max_input_len == 0 {
            return Err(HtmlError::Config(
                "maxInputLen must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
