use std::fmt::Display;

use getset::{CopyGetters, Getters};

use crate::base::log::{line_range, Message, Severity, SourceCodeDisplay};

/// Is an enumeration of the ways lexing a template can fail.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum ErrorKind {
    #[error("Unclosed raw block")]
    UnclosedRawBlock,
    #[error("Unclosed expression")]
    UnclosedExpression,
    #[error("Unexpected character in expression: '{0}'")]
    UnexpectedCharacter(char),
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Unterminated path literal")]
    UnterminatedPathLiteral,
    #[error("bad number syntax: {0:?}")]
    BadNumberSyntax(String),
    #[error("Unclosed comment")]
    UnclosedComment,
    #[error("Expected closeDelimiter tag")]
    ExpectedCloseDelimiter,
    #[error("Expected open and close delimiter tags")]
    MissingDelimiterTag,
}

impl ErrorKind {
    /// Returns a hint on how to fix the error, if there is one.
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::UnclosedRawBlock => Some("a raw block must be closed by `{{{{/name}}}}`"),
            Self::UnclosedExpression => Some("this mustache is never closed"),
            Self::UnterminatedString => Some("string literals cannot span multiple lines"),
            Self::UnterminatedPathLiteral => {
                Some("path literals must be closed by `]` on the same line")
            }
            Self::ExpectedCloseDelimiter | Self::MissingDelimiterTag => {
                Some("delimiters are reassigned with `{{=<open> <close>=}}`")
            }
            Self::UnexpectedCharacter(_) | Self::BadNumberSyntax(_) | Self::UnclosedComment => None,
        }
    }
}

/// A lexical error, located at the position where scanning stopped.
///
/// The error keeps the source line it occurred on, so its [`Display`] renders the complete
/// diagnostic without needing the template.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, CopyGetters, Getters, thiserror::Error,
)]
pub struct Error {
    kind: ErrorKind,

    /// Get the byte offset at which scanning stopped.
    #[get_copy = "pub"]
    start: usize,

    /// Get the 1-based line at which scanning stopped.
    #[get_copy = "pub"]
    line: usize,

    /// Get the text of the line scanning stopped on.
    #[get = "pub"]
    source_line: String,

    /// Byte offset of `start` within `source_line`.
    column: usize,
}

impl Error {
    /// Creates a new error at `start` in `source`.
    #[must_use]
    pub fn new(kind: ErrorKind, source: &str, start: usize, line: usize) -> Self {
        let range = line_range(source, start);
        let column = start.clamp(range.start, range.end) - range.start;

        Self {
            kind,
            start,
            line,
            source_line: source[range].trim_end_matches('\r').to_string(),
            column,
        }
    }

    /// Get the kind of the error.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}",
            Message::new(Severity::Error, &self.kind),
            SourceCodeDisplay::new(&self.source_line, self.column, self.line, self.kind.help())
        )
    }
}
