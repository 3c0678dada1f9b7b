use std::{fmt::Display, sync::Mutex};

/// Represents a trait responsible for handling diagnostics in the lexer.
pub trait Handler<T> {
    /// Receive an error and handles it.
    fn receive(&self, error: T);

    /// Whether any error has been received so far.
    fn has_received(&self) -> bool;
}

/// Prints every received error to stderr.
#[derive(Debug, Default)]
pub struct PrintHandler {
    printed: Mutex<bool>,
}

impl PrintHandler {
    /// Creates a new [`PrintHandler`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Display> Handler<T> for PrintHandler {
    fn receive(&self, error: T) {
        eprintln!("{error}");
        if let Ok(mut printed) = self.printed.lock() {
            *printed = true;
        }
    }

    fn has_received(&self) -> bool {
        self.printed.lock().map_or(true, |printed| *printed)
    }
}

/// Records every received error without printing anything.
#[derive(Debug)]
pub struct SilentHandler<T> {
    received: Mutex<Vec<T>>,
}

impl<T> Default for SilentHandler<T> {
    fn default() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
        }
    }
}

impl<T> SilentHandler<T> {
    /// Creates a new [`SilentHandler`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the handler and returns the recorded errors in the order they were received.
    #[must_use]
    pub fn into_received(self) -> Vec<T> {
        self.received
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T> Handler<T> for SilentHandler<T> {
    fn receive(&self, error: T) {
        self.received
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(error);
    }

    fn has_received(&self) -> bool {
        !self
            .received
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_empty()
    }
}
