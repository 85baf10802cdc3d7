//! Owned tokens and the token accumulator used for serialization.
//!
//! A [`Tokens`] value is the flat output of walking a tree: every token of
//! every node, in document order. Writing it out is the only way bytes leave
//! the document model.

use std::fmt;
use std::io;

use hcledit_tokenizer::Tokenizer;

use crate::syntax_kind::{SyntaxKind, SyntaxToken};

/// An immutable lexical unit: a token kind plus its raw text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: SyntaxKind,
    text: String,
}

impl Token {
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

impl From<&SyntaxToken> for Token {
    fn from(token: &SyntaxToken) -> Self {
        Self::new(token.kind(), token.text())
    }
}

/// An ordered, append-only sequence of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens(Vec<Token>);

impl Tokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    /// Append every token of `other`, in order.
    pub fn append(&mut self, other: Tokens) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenated text of all tokens.
    pub fn text(&self) -> String {
        self.0.iter().map(Token::text).collect()
    }

    /// Write every token's bytes to `sink`, in order.
    ///
    /// Returns the number of bytes written. Errors from the sink are
    /// returned as-is; nothing is retried.
    pub fn write_to<W: io::Write>(&self, mut sink: W) -> io::Result<usize> {
        let mut written = 0;
        for token in &self.0 {
            sink.write_all(token.as_bytes())?;
            written += token.text.len();
        }
        Ok(written)
    }

    /// The tokens as a standalone byte buffer.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.iter().map(|t| t.text.len()).sum());
        for token in &self.0 {
            out.extend_from_slice(token.as_bytes());
        }
        out
    }

    /// `(kind, text)` pairs, the shape the tree builders consume.
    pub(crate) fn as_pairs(&self) -> Vec<(SyntaxKind, &str)> {
        self.0.iter().map(|t| (t.kind, t.text.as_str())).collect()
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            f.write_str(&token.text)?;
        }
        Ok(())
    }
}

impl FromIterator<Token> for Tokens {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Token> for Tokens {
    fn extend<I: IntoIterator<Item = Token>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Tokens {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Lex `source` into owned tokens without building a tree.
///
/// Useful for handing raw expression text to
/// [`Attribute::set_raw`](crate::ast::Attribute::set_raw).
pub fn lex(source: &str) -> Tokens {
    Tokenizer::new(source)
        .map(|t| Token::new(SyntaxKind::from(t.kind), t.text))
        .collect()
}
