//! Contains the [`Token`] struct and its related types.

use std::{collections::HashMap, fmt::Display, str::FromStr, sync::OnceLock};

use enum_as_inner::EnumAsInner;
use getset::{CopyGetters, Getters};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Is an enumeration of the opening mustache forms.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum OpenKind {
    /// `{{` or `{{&`
    Plain,
    /// `{{{`
    Unescaped,
    /// `{{#`
    Block,
    /// `{{/`
    EndBlock,
    /// `{{>`
    Partial,
    /// `{{^`
    Inverse,
    /// `{{else`
    InverseChain,
    /// `{{{{`
    RawBlock,
    /// `{{{{/`
    EndRawBlock,
}

impl OpenKind {
    /// Gets the display name of the token kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "Open",
            Self::Unescaped => "OpenUnescaped",
            Self::Block => "OpenBlock",
            Self::EndBlock => "OpenEndBlock",
            Self::Partial => "OpenPartial",
            Self::Inverse => "OpenInverse",
            Self::InverseChain => "OpenInverseChain",
            Self::RawBlock => "OpenRawBlock",
            Self::EndRawBlock => "OpenEndRawBlock",
        }
    }
}

/// Is an enumeration of the closing mustache forms.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum CloseKind {
    /// `}}`
    Plain,
    /// `}}}`
    Unescaped,
    /// `}}}}`
    RawBlock,
}

impl CloseKind {
    /// Gets the display name of the token kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "Close",
            Self::Unescaped => "CloseUnescaped",
            Self::RawBlock => "CloseRawBlock",
        }
    }
}

/// Is an enumeration containing all kinds of tokens produced by the lexer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumAsInner)]
pub enum TokenKind {
    /// Literal text outside of mustaches.
    Content,
    /// `{{! ... }}` or `{{!-- ... --}}`, delimiters included.
    Comment,
    /// Identifier, `.`, `..` or `[path literal]`.
    Id,
    /// String literal, quotes stripped and escaped quotes unescaped.
    String,
    /// Numeric literal.
    Number,
    /// `true` or `false`.
    Boolean,
    /// An opening mustache.
    Open(OpenKind),
    /// A closing mustache.
    Close(CloseKind),
    /// `{{^}}` or `{{else}}`, closed immediately.
    Inverse,
    /// `(`
    OpenSexpr,
    /// `)`
    CloseSexpr,
    /// `as |`
    OpenBlockParams,
    /// `|`
    CloseBlockParams,
    /// `=`
    Equals,
    /// `@`
    Data,
    /// `/` or `.` inside a path
    Sep,
    /// A lexical error; the token value holds the message.
    Error,
    /// End of input.
    Eof,
}

/// Kinds without a nested [`OpenKind`]/[`CloseKind`].
const SIMPLE_KINDS: [TokenKind; 16] = [
    TokenKind::Content,
    TokenKind::Comment,
    TokenKind::Id,
    TokenKind::String,
    TokenKind::Number,
    TokenKind::Boolean,
    TokenKind::Inverse,
    TokenKind::OpenSexpr,
    TokenKind::CloseSexpr,
    TokenKind::OpenBlockParams,
    TokenKind::CloseBlockParams,
    TokenKind::Equals,
    TokenKind::Data,
    TokenKind::Sep,
    TokenKind::Error,
    TokenKind::Eof,
];

impl TokenKind {
    /// Gets the display name of the token kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "Content",
            Self::Comment => "Comment",
            Self::Id => "ID",
            Self::String => "String",
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Open(kind) => kind.as_str(),
            Self::Close(kind) => kind.as_str(),
            Self::Inverse => "Inverse",
            Self::OpenSexpr => "OpenSexpr",
            Self::CloseSexpr => "CloseSexpr",
            Self::OpenBlockParams => "OpenBlockParams",
            Self::CloseBlockParams => "CloseBlockParams",
            Self::Equals => "Equals",
            Self::Data => "Data",
            Self::Sep => "Sep",
            Self::Error => "Error",
            Self::Eof => "EOF",
        }
    }

    /// Returns an iterator over every token kind.
    pub fn iter() -> impl Iterator<Item = Self> {
        SIMPLE_KINDS
            .into_iter()
            .chain(OpenKind::iter().map(Self::Open))
            .chain(CloseKind::iter().map(Self::Close))
    }

    /// Whether a token of this kind ends the stream.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Eof | Self::Error)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Is an error that is returned when a string cannot be parsed into a [`TokenKind`] in
/// [`FromStr`] trait implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, thiserror::Error)]
#[error("invalid string representation of token kind.")]
pub struct TokenKindParseError;

impl FromStr for TokenKind {
    type Err = TokenKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static STRING_KIND_MAP: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();
        let map = STRING_KIND_MAP.get_or_init(|| {
            let mut map = HashMap::new();

            for kind in Self::iter() {
                map.insert(kind.as_str(), kind);
            }

            map
        });

        map.get(s).copied().ok_or(TokenKindParseError)
    }
}

/// A single lexical unit of a template.
///
/// `start` is the byte offset of the token's first character in the input and `line` the
/// 1-based line it sits on.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Getters, CopyGetters)]
pub struct Token {
    /// Get the kind of the token.
    #[get_copy = "pub"]
    kind: TokenKind,

    /// Get the text the token stands for.
    #[get = "pub"]
    value: String,

    /// Get the byte offset of the token.
    #[get_copy = "pub"]
    start: usize,

    /// Get the 1-based line number of the token.
    #[get_copy = "pub"]
    line: usize,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, start: usize, line: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            start,
            line,
        }
    }

    /// Dissolves the token into its value.
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const MAX_DISPLAYED_CHARS: usize = 10;

        match self.kind {
            TokenKind::Eof => f.write_str("EOF"),
            TokenKind::Error => f.write_str(&self.value),
            kind => match self.value.char_indices().nth(MAX_DISPLAYED_CHARS) {
                Some((cut, _)) => write!(f, "{kind}{{{:?}...}}", &self.value[..cut]),
                None => write!(f, "{kind}{{{:?}}}", self.value),
            },
        }
    }
}
