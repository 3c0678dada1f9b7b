//! Contains the [`TokenSource`] and [`TokenStream`] structs, the two ways of consuming the
//! lexer's output.

use std::{fmt::Debug, thread::JoinHandle};

use crossbeam::channel::{self, Receiver};
use derive_more::Deref;

use crate::base::{self, Handler};

use super::{
    lexer::Lexer,
    token::{Token, TokenKind},
};

/// Handle to a scan running on its own thread.
///
/// The scanning thread hands every token over a zero-capacity channel: it blocks until the
/// token has been taken, and [`TokenSource::next_token`] blocks until the next token is ready.
/// Dropping the handle before the terminal token makes the scanning thread stop at its next
/// handoff.
#[derive(Debug)]
pub struct TokenSource {
    receiver: Receiver<Token>,
    worker: Option<JoinHandle<()>>,
}

impl TokenSource {
    /// Starts scanning the given lexer on a new thread.
    #[must_use]
    pub fn spawn(lexer: Lexer) -> Self {
        let (sender, receiver) = channel::bounded(0);

        let worker = std::thread::spawn(move || {
            for token in lexer {
                if sender.send(token).is_err() {
                    tracing::trace!("token consumer went away, stopping scan");
                    break;
                }
            }
        });

        Self {
            receiver,
            worker: Some(worker),
        }
    }

    /// Blocks until the next token is available and returns it.
    ///
    /// Returns `None` once the terminal [`TokenKind::Eof`] or [`TokenKind::Error`] token has
    /// been returned.
    ///
    /// # Panics
    /// If the scanning thread panicked, the panic is resumed on the calling thread.
    pub fn next_token(&mut self) -> Option<Token> {
        if let Ok(token) = self.receiver.recv() {
            return Some(token);
        }

        if let Some(worker) = self.worker.take() {
            if let Err(panic) = worker.join() {
                std::panic::resume_unwind(panic);
            }
        }

        None
    }
}

impl Iterator for TokenSource {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Begins scanning `input` with the default delimiters.
#[must_use]
pub fn scan(input: impl Into<String>) -> TokenSource {
    TokenSource::spawn(Lexer::new(input))
}

/// Scans `input` to completion and returns every token, the terminal one included.
///
/// This buffers the whole token sequence and is meant for debugging and tests, consumers
/// should pull from [`scan`] instead.
#[must_use]
pub fn collect(input: impl Into<String>) -> Vec<Token> {
    let mut source = scan(input);
    let mut tokens = Vec::new();

    while let Some(token) = source.next_token() {
        let kind = token.kind();
        tokens.push(token);

        if kind.is_terminal() {
            break;
        }
    }

    tokens
}

/// The token sequence of a template, collected on the calling thread.
///
/// The sequence ends with the [`TokenKind::Eof`] token unless lexing failed.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref)]
pub struct TokenStream {
    #[deref]
    tokens: Vec<Token>,
}

impl Debug for TokenStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tokens.iter()).finish()
    }
}

impl TokenStream {
    /// Tokenizes the given template on the calling thread.
    ///
    /// A lexical error is passed to the handler. The returned stream then holds the tokens
    /// scanned before the error, without the error token itself.
    #[must_use]
    #[tracing::instrument(level = "debug", skip_all, fields(len = lexer.input().len()))]
    pub fn tokenize(mut lexer: Lexer, handler: &impl Handler<base::Error>) -> Self {
        let mut tokens = Vec::new();

        for token in lexer.by_ref() {
            if token.kind() == TokenKind::Error {
                break;
            }
            tokens.push(token);
        }

        if let Some(error) = lexer.failure() {
            tracing::error!("Fatal lexical error encountered while tokenizing template");
            handler.receive(error.clone().into());
        }

        tracing::debug!(count = tokens.len(), "Tokenized template");

        Self { tokens }
    }

    /// Whether the stream reached the end of the input.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|token| token.kind() == TokenKind::Eof)
    }

    /// Dissolves this struct into its tokens.
    #[must_use]
    pub fn dissolve(self) -> Vec<Token> {
        self.tokens
    }
}
