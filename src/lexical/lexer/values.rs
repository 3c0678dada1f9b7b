//! Sub-states scanning literal values and delimiter reassignment.

use super::{is_ignorable, ErrorKind, Lexer, PatternSet, State, TokenKind};
use crate::lexical::delimiters::Delimiters;

const DECIMAL_DIGITS: &str = "0123456789";
const HEX_DIGITS: &str = "0123456789abcdefABCDEF";

impl Lexer {
    /// Scans a quoted string, emitting its content without the quotes.
    pub(super) fn lex_string(&mut self) -> Option<State> {
        let Some(quote) = self.cursor.next_char() else {
            unreachable!("string expected at offset {}", self.cursor.pos());
        };
        self.cursor.ignore();

        let mut previous = None;
        loop {
            match self.cursor.next_char() {
                None | Some('\n') => return self.fail(ErrorKind::UnterminatedString),
                Some(character) if character == quote && previous != Some('\\') => break,
                character => previous = character,
            }
        }

        self.cursor.backup();

        let value = self
            .cursor
            .pending()
            .replace(&format!("\\{quote}"), &quote.to_string());
        let token = self.cursor.emit_value(TokenKind::String, value);
        self.produce(token);

        // closing quote
        self.cursor.next_char();
        self.cursor.ignore();

        Some(State::Expression)
    }

    /// Scans a number: decimal, hex, float, imaginary or complex.
    ///
    /// This accepts more than valid numbers (`089` or `0x1.2` pass), turning the scanned text
    /// into an actual value is left to the parser.
    pub(super) fn lex_number(&mut self) -> Option<State> {
        if !self.scan_number() {
            return self.bad_number();
        }

        if matches!(self.cursor.peek(), Some('+' | '-')) {
            // complex: 1+2i, no spaces, must end in `i`
            if !self.scan_number() || !self.cursor.pending().ends_with('i') {
                return self.bad_number();
            }
        }

        self.emit(TokenKind::Number);

        Some(State::Expression)
    }

    fn bad_number(&mut self) -> Option<State> {
        let text = self.cursor.pending().to_string();
        self.fail(ErrorKind::BadNumberSyntax(text))
    }

    /// Consumes one number, returning whether it is followed by a valid boundary.
    fn scan_number(&mut self) -> bool {
        self.cursor.accept("+-");

        let mut digits = DECIMAL_DIGITS;
        if self.cursor.accept("0") && self.cursor.accept("xX") {
            digits = HEX_DIGITS;
        }

        self.cursor.accept_run(digits);

        if self.cursor.accept(".") {
            self.cursor.accept_run(digits);
        }

        if self.cursor.accept("eE") {
            self.cursor.accept("+-");
            self.cursor.accept_run(DECIMAL_DIGITS);
        }

        self.cursor.accept("i");

        if self.cursor.find(&self.patterns.alphanumeric).is_some() {
            self.cursor.next_char();
            return false;
        }

        true
    }

    /// Scans a bare identifier.
    pub(super) fn lex_identifier(&mut self) -> Option<State> {
        let Some(found) = self.cursor.find(&self.patterns.id) else {
            unreachable!(
                "identifier expected at offset {}, found {:?}",
                self.cursor.pos(),
                self.cursor.rest()
            );
        };

        let len = found.len();
        self.cursor.advance(len);
        self.emit(TokenKind::Id);

        Some(State::Expression)
    }

    /// Scans a `[path literal]`, the opening bracket has already been consumed.
    pub(super) fn lex_path_literal(&mut self) -> Option<State> {
        loop {
            match self.cursor.next_char() {
                None | Some('\n') => return self.fail(ErrorKind::UnterminatedPathLiteral),
                Some(']') => break,
                Some(_) => {}
            }
        }

        self.emit(TokenKind::Id);

        Some(State::Expression)
    }

    /// Scans `<open> <close>=}}` after `{{=` and switches to the new delimiters.
    pub(super) fn lex_delimiter_assignment(&mut self) -> Option<State> {
        self.skip_ignorable();

        self.cursor.accept_while(|character| !character.is_ascii_whitespace());
        let open = self.cursor.pending().to_string();
        self.cursor.ignore();

        self.skip_ignorable();

        self.cursor
            .accept_while(|character| character != '=' && !character.is_ascii_whitespace());
        let close = self.cursor.pending().to_string();
        self.cursor.ignore();

        self.skip_ignorable();

        let Some(found) = self.cursor.find(&self.patterns.close_set_delimiters_pattern) else {
            return self.fail(ErrorKind::ExpectedCloseDelimiter);
        };
        let len = found.len();

        let Some(delimiters) = Delimiters::new(open, close) else {
            return self.fail(ErrorKind::MissingDelimiterTag);
        };

        self.cursor.advance(len);
        self.cursor.ignore();

        tracing::debug!(
            open = %delimiters.open(),
            close = %delimiters.close(),
            line = self.cursor.line(),
            "delimiters reassigned"
        );
        self.patterns = PatternSet::compile(delimiters);

        Some(State::Content)
    }

    fn skip_ignorable(&mut self) {
        self.cursor.accept_while(is_ignorable);
        self.cursor.ignore();
    }
}
