use std::fmt;

/// A 1-based position in the original, pre-normalization source text.
///
/// `column` is only meaningful for errors raised inside the inline
/// (flow-style) parser; block-level errors report the line alone.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Position {
    pub line: usize,
    pub column: Option<usize>,
}

impl Position {
    #[must_use]
    pub fn new(line: usize) -> Self {
        Position { line, column: None }
    }

    #[must_use]
    pub fn with_column(line: usize, column: usize) -> Self {
        Position {
            line,
            column: Some(column),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(col) => write!(f, "line {} col {}", self.line, col + 1),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// Every failure mode the parser and its reader facade can raise.
///
/// All variants carry enough context to reproduce the original source's
/// error messages: a position and the offending line's verbatim text where
/// one is available.
#[derive(thiserror::Error, Clone, Debug)]
pub enum Error {
    #[error("tabs are not allowed for indentation at {0}: {1:?}")]
    TabIndentation(Position, String),

    #[error("inconsistent indentation at {0}: {1:?}")]
    IndentationError(Position, String),

    #[error("unexpected top-level content at {0} after a prior block ended without a `---` document separator: {1:?}")]
    StructureError(Position, String),

    #[error("malformed inline YAML at {0}: {1}\n  {2:?}")]
    MalformedInline(Position, String, String),

    #[error("unable to merge `<<` at {0}: {1}\n  {2:?}")]
    MergeError(Position, String, String),

    #[error("reference to unknown anchor `{1}` at {0}\n  {2:?}")]
    ReferenceError(Position, String, String),

    #[error("regex engine reported an internal limit at {0}: {1}")]
    RegexEngineError(Position, String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unable to read file {path}: {source}")]
    FileUnreadable {
        path: String,
        #[source]
        source: std::sync::Arc<std::io::Error>,
    },

    #[error("{0}")]
    Custom(String),
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl Error {
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::TabIndentation(p, _)
            | Error::IndentationError(p, _)
            | Error::StructureError(p, _)
            | Error::MalformedInline(p, _, _)
            | Error::MergeError(p, _, _)
            | Error::ReferenceError(p, _, _)
            | Error::RegexEngineError(p, _) => Some(*p),
            Error::FileNotFound(_) | Error::FileUnreadable { .. } | Error::Custom(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
