//! The byte and line tracking cursor the lexer states drive.

use regex::Regex;

use super::{
    delimiters::find_at_start,
    token::{Token, TokenKind},
};

/// A cursor over the complete template source.
///
/// Everything between `start` and `pos` is the token being scanned. Bytes leave that window
/// either as part of an emitted token or by being ignored, and both count the newlines they
/// contain, so `line` is always the line of `start`.
#[derive(Debug, Clone)]
pub struct Cursor {
    input: String,
    pos: usize,
    start: usize,
    line: usize,
    /// Size of the last code point returned by [`Cursor::next_char`]; `None` once it has been backed
    /// up over.
    width: Option<usize>,
}

impl Cursor {
    /// Creates a cursor at the start of `input`.
    #[must_use]
    pub fn new(input: String) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            line: 1,
            width: None,
        }
    }

    /// Returns the whole input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the current byte position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the byte offset of the token being scanned.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the line of the token being scanned.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the input not scanned yet.
    #[must_use]
    pub fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// Returns the text scanned since the last token boundary.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.input[self.start..self.pos]
    }

    /// Consumes and returns the next code point, or `None` at the end of the input.
    pub fn next_char(&mut self) -> Option<char> {
        let character = self.rest().chars().next();
        let width = character.map_or(0, char::len_utf8);

        self.width = Some(width);
        self.pos += width;

        character
    }

    /// Returns the next code point without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Steps back over the code point returned by the last call to [`Cursor::next_char`].
    ///
    /// # Panics
    /// If called twice without an intervening [`Cursor::next_char`].
    pub fn backup(&mut self) {
        let width = self
            .width
            .take()
            .unwrap_or_else(|| panic!("backup at {} without a preceding next_char", self.pos));

        self.pos -= width;
    }

    /// Consumes the next code point if it is one of `valid`.
    pub fn accept(&mut self, valid: &str) -> bool {
        if self.next_char().is_some_and(|character| valid.contains(character)) {
            return true;
        }

        self.backup();

        false
    }

    /// Consumes all following code points that are part of `valid`.
    pub fn accept_run(&mut self, valid: &str) {
        while self.next_char().is_some_and(|character| valid.contains(character)) {}

        self.backup();
    }

    /// Consumes all following code points matching `predicate`.
    pub fn accept_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.next_char();
        }
    }

    /// Moves forward by `len` bytes, which must end on a code point boundary.
    pub fn advance(&mut self, len: usize) {
        debug_assert!(self.input.is_char_boundary(self.pos + len));

        self.pos += len;
        self.width = None;
    }

    /// Whether the unscanned input starts with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Returns the text `pattern` matches at the current position.
    #[must_use]
    pub fn find(&self, pattern: &Regex) -> Option<&str> {
        find_at_start(pattern, self.rest())
    }

    /// Returns how far ahead the first match of `pattern` starts.
    #[must_use]
    pub fn index_of(&self, pattern: &Regex) -> Option<usize> {
        pattern.find(self.rest()).map(|found| found.start())
    }

    /// Discards everything scanned since the last token boundary.
    pub fn ignore(&mut self) {
        self.line += count_newlines(self.pending());
        self.start = self.pos;
    }

    /// Produces a token spanning the scanned text and moves the boundary past it.
    pub fn emit(&mut self, kind: TokenKind) -> Token {
        let value = self.pending().to_string();
        self.emit_value(kind, value)
    }

    /// Produces a token with the given value for the scanned text and moves the boundary past
    /// it.
    pub fn emit_value(&mut self, kind: TokenKind, value: String) -> Token {
        let token = Token::new(kind, value, self.start, self.line);
        self.ignore();

        token
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&byte| byte == b'\n').count()
}
