//! The lexical module is responsible for converting template text into a stream of tokens that
//! a parser can understand.

pub mod cursor;
pub mod delimiters;
pub mod token;
pub mod token_stream;

mod error;
pub use error::{Error, ErrorKind};

mod lexer;
pub use lexer::Lexer;

#[doc(inline)]
pub use token_stream::{collect, scan, TokenSource, TokenStream};
