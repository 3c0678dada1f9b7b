//! A streaming lexer for mustache templates.
//!
//! Templates are free-form text with expressions embedded between `{{` and `}}`. The lexer turns
//! such a template into the ordered sequence of tokens a parser builds its tree from: content,
//! comments, raw blocks, every opening and closing mustache form, and the identifiers, strings,
//! numbers and punctuation found inside expressions. The delimiters themselves can be
//! reassigned in the middle of a template with `{{=<% %>=}}`.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    clippy::missing_errors_doc
)]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::missing_panics_doc, clippy::missing_const_for_fn)]

pub mod base;
pub mod lexical;

use base::{Handler, Result};

use crate::{
    base::Error,
    lexical::{Lexer, TokenStream},
};

#[doc(inline)]
pub use lexical::{collect, scan, token::Token, TokenSource};

/// Converts the given template to tokens on the calling thread.
///
/// # Errors
/// - If the template contains a lexical error. The error itself is passed to `handler`.
pub fn tokenize(handler: &impl Handler<Error>, input: &str) -> Result<TokenStream> {
    let tokens = TokenStream::tokenize(Lexer::new(input), handler);

    if !tokens.is_complete() {
        return Err(Error::Other(
            "An error occurred while tokenizing the template.",
        ));
    }

    Ok(tokens)
}
