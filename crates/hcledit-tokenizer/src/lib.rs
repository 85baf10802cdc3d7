//! A lossless tokenizer for HCL native syntax.
//!
//! Every byte of the input ends up in exactly one token, including
//! whitespace, newlines and comments, so the concatenated token texts
//! always reproduce the source.

mod span;
pub use span::Span;

mod token;
pub use token::{Token, TokenKind};

mod tokenizer;
pub use tokenizer::Tokenizer;
