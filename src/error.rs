use thiserror::Error;

/// A problem with a single `Dialogue:` line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid timecode: {0}")]
    InvalidTimecode(String),

    #[error("expected {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },

    #[error("the Format header has no '{0}' column")]
    MissingColumn(&'static str),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("no Events section or Format header found")]
    MissingFormat,

    #[error("malformed dialogue on line {line}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error("failed to render output")]
    Render(#[from] std::fmt::Error),
}
