use thiserror::Error;

pub type HtmlResult<T> = Result<T, HtmlError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HtmlError {
    #[error("Input too large: {len} bytes exceeds the limit of {max} bytes")]
    InputTooLarge { len: usize, max: usize },

    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    MaxNestingDepthExceeded { max_depth: usize },

    #[error("Invalid limits configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl HtmlError {
    /// True for the conditions that mean the input is too complex to compile
    /// within the configured limits.
    pub fn is_too_complex(&self) -> bool {
        matches!(
            self,
            HtmlError::InputTooLarge { .. } | HtmlError::MaxNestingDepthExceeded { .. }
        )
    }
}

impl From<serde_yaml::Error> for HtmlError {
    fn from(err: serde_yaml::Error) -> Self {
        HtmlError::Config(err.to_string())
    }
}

impl From<std::io::Error> for HtmlError {
    fn from(err: std::io::Error) -> Self {
        HtmlError::Io(err.to_string())
    }
}
