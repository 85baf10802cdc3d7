//! Lossless, editable syntax tree for HCL configuration files.
//!
//! This crate parses HCL native syntax into a CST (Concrete Syntax Tree)
//! built on the [rowan](https://docs.rs/rowan) library. Every byte of the
//! source, whitespace and comments included, lives in exactly one token of
//! the tree, so serializing an unedited tree reproduces the input exactly.
//!
//! Edits are structural: set an attribute, append a block, move a block
//! from one body to another. Only the edited nodes change; every other
//! region of the document keeps its original bytes.
//!
//! # Features
//!
//! - **Byte-for-byte round-trip**: parse then serialize is the identity
//! - **Cheap handles**: syntax nodes use reference counting internally
//! - **Parent pointers**: navigate up and down the tree
//! - **Typed AST layer**: ergonomic wrappers over raw CST nodes
//! - **Recoverable parsing**: malformed lines are kept, not dropped
//!
//! # Example
//!
//! ```
//! use hcledit_cst::{File, Value};
//!
//! let source = r#"# web tier
//! resource "aws_instance" "web" {
//!   ami = "ami-123" # pinned
//! }
//! "#;
//!
//! let file = File::parse(source).unwrap();
//! assert_eq!(file.to_string(), source);
//!
//! let block = file
//!     .body()
//!     .first_matching_block("resource", &["aws_instance", "web"])
//!     .unwrap();
//! let body = block.body().unwrap();
//! body.set_attribute_value("count", &Value::Int(2)).unwrap();
//!
//! assert_eq!(
//!     file.to_string(),
//!     r#"# web tier
//! resource "aws_instance" "web" {
//!   ami = "ami-123" # pinned
//!   count = 2
//! }
//! "#
//! );
//! ```
//!
//! # Diagnostics
//!
//! ```
//! use hcledit_cst::File;
//!
//! let (file, errors) = File::parse_lossy("a {\n  b = 1\n");
//! assert_eq!(errors.len(), 1);
//! // The malformed document still round-trips.
//! assert_eq!(file.to_string(), "a {\n  b = 1\n");
//! ```

pub mod ast;
pub mod diagnostic;
mod edit;
pub mod error;
pub mod file;
pub mod make;
pub mod parser;
pub mod style;
pub mod syntax_kind;
pub mod tokens;
pub mod tree;
pub mod value;

pub use ast::{
    AstNode, Attribute, BlankLine, Block, Body, BodyItem, Comments, Expression, Heredoc,
    Identifier, Number, Quoted, Unparsed,
};
pub use diagnostic::{ParseError, ParseErrorKind, ParseErrors};
pub use error::EditError;
pub use file::File;
pub use parser::{Parse, parse};
pub use style::{LineEnding, Style};
pub use syntax_kind::{HclLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use tokens::{Token, Tokens, lex};
pub use value::{Value, tokens_for_identifier, tokens_for_traversal, tokens_for_value};

// Re-export rowan types for convenience
pub use rowan::{TextRange, TextSize};
