//! Module containing structures and implementations for logging messages to the user.

use colored::Colorize;
use std::{fmt::Display, ops::Range};

/// Represent the severity of a log message to be printed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Severity {
    Error,
}

/// Struct implementing [`Display`] that represents a log message to be displayed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Message<T> {
    /// The severity of the log message.
    pub severity: Severity,

    /// The message to be displayed.
    pub display: T,
}
impl<T> Message<T> {
    /// Create a new log message with the given severity and message to be displayed.
    pub fn new(severity: Severity, display: T) -> Self {
        Self { severity, display }
    }
}

impl<T: Display> Display for Message<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let log_header = (match self.severity {
            Severity::Error => "[error]:".red(),
        })
        .bold();

        let message_part = &self.display.to_string().bold();

        write!(f, "{log_header} {message_part}")
    }
}

/// Structure implementing [`Display`] that prints the source line containing a byte offset,
/// with a caret under the offending character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceCodeDisplay<'a, T> {
    /// The complete source text.
    pub source: &'a str,

    /// Byte offset to point at.
    pub offset: usize,

    /// 1-based line number of `offset`.
    pub line: usize,

    /// The help message to be displayed.
    pub help_display: Option<T>,
}

impl<'a, T> SourceCodeDisplay<'a, T> {
    /// Create a new source code display pointing at `offset`, which lies on `line`.
    pub fn new(source: &'a str, offset: usize, line: usize, help_display: Option<T>) -> Self {
        Self {
            source,
            offset,
            line,
            help_display,
        }
    }

    /// Returns the text of the line containing the offset and the column (in characters) of the
    /// offset within it.
    fn line_and_column(&self) -> (&'a str, usize) {
        let offset = floor_char_boundary(self.source, self.offset);
        let line = line_range(self.source, offset);

        let text = self.source[line.clone()].trim_end_matches('\r');
        let column = self.source[line.start..offset].chars().count();

        (text, column)
    }
}

/// Returns the byte range of the line containing `offset`, without its trailing `\n`.
///
/// Offsets past the end or inside a code point are moved back to the closest code point start.
#[must_use]
pub fn line_range(source: &str, offset: usize) -> Range<usize> {
    let offset = floor_char_boundary(source, offset);

    let start = source[..offset].rfind('\n').map_or(0, |index| index + 1);
    let end = source[offset..]
        .find('\n')
        .map_or(source.len(), |index| offset + index);

    start..end
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }

    offset
}

impl<'a, T: std::fmt::Display> Display for SourceCodeDisplay<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (text, column) = self.line_and_column();
        let gutter = self.line.to_string();
        let padding = " ".repeat(gutter.len());

        writeln!(f, "{padding} {}", "|".blue().bold())?;
        writeln!(f, "{} {} {text}", gutter.blue().bold(), "|".blue().bold())?;
        write!(
            f,
            "{padding} {} {}{}",
            "|".blue().bold(),
            " ".repeat(column),
            "^".red().bold()
        )?;

        if let Some(help_display) = &self.help_display {
            write!(f, "\n\n{help_display}")?;
        }

        Ok(())
    }
}
