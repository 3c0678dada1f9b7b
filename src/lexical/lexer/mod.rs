//! The scanning state machine.

mod values;

use super::{
    cursor::Cursor,
    delimiters::{CommentStyle, Delimiters, PatternSet, UNALLOWED_ID_CHARS},
    error::{Error, ErrorKind},
    token::{CloseKind, OpenKind, Token, TokenKind},
};

/// The scanning states.
///
/// Each step runs one state and yields the next one, or `None` once a terminal token has been
/// produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Content,
    EscapedOpen,
    OpenMustache,
    CloseMustache,
    Expression,
    Ignorable,
    String,
    Number,
    Identifier,
    PathLiteral,
    DelimiterAssignment,
    Comment,
    /// Content has been flushed at the end of the input, only EOF is left.
    End,
}

/// A lexical analyzer for one template.
///
/// The lexer is a pull-based [`Iterator`]: every call to [`Iterator::next`] runs the state
/// machine until exactly one token is ready. The last token is always either
/// [`TokenKind::Eof`] or [`TokenKind::Error`], after which the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Lexer {
    cursor: Cursor,
    patterns: PatternSet,
    state: Option<State>,
    /// The token produced by the current step, at most one is in flight.
    produced: Option<Token>,
    /// Whether the body of a raw block is being scanned.
    raw_block: bool,
    /// Comment syntax of the comment being scanned.
    comment_style: CommentStyle,
    failure: Option<Error>,
}

impl Lexer {
    /// Creates a lexer for `input` using the default `{{` / `}}` delimiters.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self::with_delimiters(input, Delimiters::default())
    }

    /// Creates a lexer for `input` starting with the given delimiters.
    #[must_use]
    pub fn with_delimiters(input: impl Into<String>, delimiters: Delimiters) -> Self {
        Self {
            cursor: Cursor::new(input.into()),
            patterns: PatternSet::compile(delimiters),
            state: Some(State::Content),
            produced: None,
            raw_block: false,
            comment_style: CommentStyle::Plain,
            failure: None,
        }
    }

    /// Returns the complete input being scanned.
    #[must_use]
    pub fn input(&self) -> &str {
        self.cursor.input()
    }

    /// Returns the delimiters currently in effect.
    #[must_use]
    pub fn delimiters(&self) -> &Delimiters {
        self.patterns.delimiters()
    }

    /// Returns the error behind the [`TokenKind::Error`] token, once it has been produced.
    #[must_use]
    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    fn produce(&mut self, token: Token) {
        assert!(
            self.produced.is_none(),
            "a step produced {token} while {} was still in flight",
            self.produced.as_ref().map_or_else(String::new, ToString::to_string)
        );

        self.produced = Some(token);
    }

    fn emit(&mut self, kind: TokenKind) {
        let token = self.cursor.emit(kind);
        self.produce(token);
    }

    fn emit_content(&mut self) {
        if self.cursor.pos() > self.cursor.start() {
            self.emit(TokenKind::Content);
        }
    }

    /// Produces the error token and stops the machine.
    fn fail(&mut self, kind: ErrorKind) -> Option<State> {
        let error = Error::new(
            kind,
            self.cursor.input(),
            self.cursor.start(),
            self.cursor.line(),
        );
        tracing::debug!(
            kind = %error.kind(),
            start = error.start(),
            line = error.line(),
            "lexical error"
        );

        let token = Token::new(
            TokenKind::Error,
            error.kind().to_string(),
            error.start(),
            error.line(),
        );
        self.produce(token);
        self.failure = Some(error);

        None
    }

    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::Content => self.lex_content(),
            State::EscapedOpen => self.lex_escaped_open(),
            State::OpenMustache => self.lex_open_mustache(),
            State::CloseMustache => self.lex_close_mustache(),
            State::Expression => self.lex_expression(),
            State::Ignorable => self.lex_ignorable(),
            State::String => self.lex_string(),
            State::Number => self.lex_number(),
            State::Identifier => self.lex_identifier(),
            State::PathLiteral => self.lex_path_literal(),
            State::DelimiterAssignment => self.lex_delimiter_assignment(),
            State::Comment => self.lex_comment(),
            State::End => {
                self.emit(TokenKind::Eof);
                None
            }
        }
    }

    /// Scans literal text outside of mustaches.
    fn lex_content(&mut self) -> Option<State> {
        let next = if self.raw_block {
            let Some(index) = self.cursor.index_of(&self.patterns.open_end_raw_lookahead) else {
                return self.fail(ErrorKind::UnclosedRawBlock);
            };

            tracing::trace!(offset = self.cursor.pos() + index, "leaving raw block");
            self.raw_block = false;
            self.cursor.advance(index);

            State::OpenMustache
        } else if self.cursor.starts_with(&self.patterns.escaped_escaped_open) {
            // keep one of the two backslashes as content
            self.cursor.next_char();
            self.emit_content();

            self.cursor.next_char();
            self.cursor.ignore();

            return Some(State::Content);
        } else if self.cursor.starts_with(&self.patterns.escaped_open) {
            State::EscapedOpen
        } else if self.cursor.find(&self.patterns.open_comment_dash).is_some() {
            self.comment_style = CommentStyle::Dash;
            State::Comment
        } else if self.cursor.find(&self.patterns.open_comment).is_some() {
            self.comment_style = CommentStyle::Plain;
            State::Comment
        } else if self.cursor.starts_with(self.patterns.open_tag()) {
            State::OpenMustache
        } else {
            if self.cursor.next_char().is_none() {
                self.emit_content();
                return Some(State::End);
            }

            return Some(State::Content);
        };

        self.emit_content();

        Some(next)
    }

    /// Scans `\{{`, turning the escaped tag into content.
    fn lex_escaped_open(&mut self) -> Option<State> {
        self.cursor.next_char();
        self.cursor.ignore();

        self.cursor.accept_while(|character| character == '{');

        Some(State::Content)
    }

    /// Scans an opening mustache.
    fn lex_open_mustache(&mut self) -> Option<State> {
        let patterns = &self.patterns;
        let mut next = State::Expression;

        let (len, kind) = if let Some(found) = self.cursor.find(&patterns.open_end_raw) {
            (found.len(), TokenKind::Open(OpenKind::EndRawBlock))
        } else if let Some(found) = self.cursor.find(&patterns.open_raw) {
            tracing::trace!(offset = self.cursor.pos(), "entering raw block");
            self.raw_block = true;
            (found.len(), TokenKind::Open(OpenKind::RawBlock))
        } else if let Some(found) = self.cursor.find(&patterns.open_unescaped) {
            (found.len(), TokenKind::Open(OpenKind::Unescaped))
        } else if let Some(found) = self.cursor.find(&patterns.open_block) {
            (found.len(), TokenKind::Open(OpenKind::Block))
        } else if let Some(found) = self.cursor.find(&patterns.open_end_block) {
            (found.len(), TokenKind::Open(OpenKind::EndBlock))
        } else if let Some(found) = self.cursor.find(&patterns.open_partial) {
            (found.len(), TokenKind::Open(OpenKind::Partial))
        } else if let Some(found) = self.cursor.find(&patterns.inverse) {
            next = State::Content;
            (found.len(), TokenKind::Inverse)
        } else if let Some(found) = self.cursor.find(&patterns.open_inverse) {
            (found.len(), TokenKind::Open(OpenKind::Inverse))
        } else if let Some(found) = self.cursor.find(&patterns.open_inverse_chain) {
            (found.len(), TokenKind::Open(OpenKind::InverseChain))
        } else if let Some(found) = self.cursor.find(&patterns.open_set_delimiters) {
            let len = found.len();
            self.cursor.advance(len);
            self.cursor.ignore();

            return Some(State::DelimiterAssignment);
        } else if let Some(found) = self.cursor.find(&patterns.open) {
            (found.len(), TokenKind::Open(OpenKind::Plain))
        } else {
            unreachable!(
                "open mustache expected at offset {}, found {:?}",
                self.cursor.pos(),
                self.cursor.rest()
            );
        };

        self.cursor.advance(len);
        self.emit(kind);

        Some(next)
    }

    /// Scans a closing mustache.
    fn lex_close_mustache(&mut self) -> Option<State> {
        let patterns = &self.patterns;

        let (len, kind) = if let Some(found) = self.cursor.find(&patterns.close_raw) {
            (found.len(), TokenKind::Close(CloseKind::RawBlock))
        } else if let Some(found) = self.cursor.find(&patterns.close_unescaped) {
            (found.len(), TokenKind::Close(CloseKind::Unescaped))
        } else if let Some(found) = self.cursor.find(&patterns.close) {
            (found.len(), TokenKind::Close(CloseKind::Plain))
        } else if self.cursor.find(&patterns.close_set_delimiters_pattern).is_some() {
            // `=}}` outside of a reassignment directive: the `=` is an ordinary equals sign
            self.cursor.advance(1);
            self.emit(TokenKind::Equals);

            return Some(State::CloseMustache);
        } else {
            unreachable!(
                "close mustache expected at offset {}, found {:?}",
                self.cursor.pos(),
                self.cursor.rest()
            );
        };

        self.cursor.advance(len);
        self.emit(kind);

        Some(State::Content)
    }

    /// Scans the inside of a mustache.
    fn lex_expression(&mut self) -> Option<State> {
        if self.patterns.is_close(self.cursor.rest()) {
            return Some(State::CloseMustache);
        }

        if let Some(found) = self.cursor.find(&self.patterns.open_block_params) {
            let len = found.len();
            self.cursor.advance(len);
            self.emit(TokenKind::OpenBlockParams);

            return Some(State::Expression);
        }

        if self.cursor.starts_with("..") {
            self.cursor.advance("..".len());
            self.emit(TokenKind::Id);

            return Some(State::Expression);
        }

        if self.cursor.find(&self.patterns.dot_id).is_some() {
            self.cursor.advance(".".len());
            self.emit(TokenKind::Id);

            return Some(State::Expression);
        }

        if self.cursor.find(&self.patterns.boolean).is_some() {
            let len = if self.cursor.starts_with("true") {
                "true".len()
            } else {
                "false".len()
            };
            self.cursor.advance(len);
            self.emit(TokenKind::Boolean);

            return Some(State::Expression);
        }

        let kind = match self.cursor.next_char() {
            None => return self.fail(ErrorKind::UnclosedExpression),
            Some(character) if is_ignorable(character) => return Some(State::Ignorable),
            Some('(') => TokenKind::OpenSexpr,
            Some(')') => TokenKind::CloseSexpr,
            Some('=') => TokenKind::Equals,
            Some('@') => TokenKind::Data,
            Some('"' | '\'') => {
                self.cursor.backup();
                return Some(State::String);
            }
            Some('/' | '.') => TokenKind::Sep,
            Some('|') => TokenKind::CloseBlockParams,
            Some('+' | '-' | '0'..='9') => {
                self.cursor.backup();
                return Some(State::Number);
            }
            Some('[') => return Some(State::PathLiteral),
            Some(character) if !UNALLOWED_ID_CHARS.contains(character) => {
                self.cursor.backup();
                return Some(State::Identifier);
            }
            Some(character) => return self.fail(ErrorKind::UnexpectedCharacter(character)),
        };

        self.emit(kind);

        Some(State::Expression)
    }

    /// Scans a comment up to the close pattern of its style.
    fn lex_comment(&mut self) -> Option<State> {
        let close = self.patterns.close_comment(self.comment_style);

        if let Some(found) = self.cursor.find(close) {
            let len = found.len();
            self.cursor.advance(len);
            self.emit(TokenKind::Comment);

            return Some(State::Content);
        }

        if self.cursor.next_char().is_none() {
            return self.fail(ErrorKind::UnclosedComment);
        }

        Some(State::Comment)
    }

    /// Skips whitespace inside a mustache.
    fn lex_ignorable(&mut self) -> Option<State> {
        self.cursor.accept_while(is_ignorable);
        self.cursor.ignore();

        Some(State::Expression)
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.produced.take() {
                return Some(token);
            }

            let state = self.state.take()?;
            self.state = self.step(state);
        }
    }
}

impl std::iter::FusedIterator for Lexer {}

/// Whether the character is skipped between expression parts.
fn is_ignorable(character: char) -> bool {
    matches!(character, ' ' | '\t' | '\n')
}
