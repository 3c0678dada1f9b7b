//! The base module contains the diagnostic plumbing shared by the lexer.

mod error;
#[doc(inline)]
pub use error::{Error, Result};

mod diagnostic;
pub use diagnostic::{Handler, PrintHandler, SilentHandler};

pub mod log;
