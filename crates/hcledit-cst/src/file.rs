//! A whole HCL document.

use std::fmt;
use std::io;

use similar::TextDiff;
use tracing::warn;

use crate::ast::{AstNode, Body};
use crate::diagnostic::{ParseError, ParseErrors};
use crate::make;
use crate::parser::{Parse, parse};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use crate::tokens::Tokens;
use crate::tree;

/// An editable HCL file.
///
/// Serializing a file that has not been edited reproduces the parsed
/// source byte for byte. After edits, regions no edit touched keep their
/// original bytes.
///
/// Cloning a `File` clones a handle: both clones see the same tree. Use
/// [`File::snapshot`] for an independent copy.
#[derive(Debug, Clone)]
pub struct File {
    root: SyntaxNode,
    original: String,
}

impl File {
    /// Parse `source`, failing if it has any syntax error.
    pub fn parse(source: &str) -> Result<File, ParseErrors> {
        let (file, errors) = File::parse_lossy(source);
        if errors.is_empty() {
            Ok(file)
        } else {
            Err(ParseErrors(errors))
        }
    }

    /// Parse `source`, keeping whatever could not be structured.
    ///
    /// The returned file still round-trips; malformed regions sit in
    /// `UNPARSED` nodes and edits leave them alone.
    pub fn parse_lossy(source: &str) -> (File, Vec<ParseError>) {
        let parsed = parse(source);
        let errors = parsed.errors().to_vec();
        (File::from_parse(&parsed, source), errors)
    }

    fn from_parse(parsed: &Parse, source: &str) -> File {
        File::from_root(parsed.syntax(), source.to_string())
    }

    fn from_root(root: SyntaxNode, original: String) -> File {
        File { root, original }
    }

    /// An empty file.
    pub fn new() -> File {
        File::from_parse(&parse(""), "")
    }

    /// The top-level body.
    ///
    /// Looked up in the tree on every call, so it follows edits that
    /// replace the root's children. A root without a body gets an empty
    /// one appended.
    pub fn body(&self) -> Body {
        if let Some(body) = self.root.children().find_map(Body::cast) {
            return body;
        }
        let body = make::empty_body();
        let len = self.root.children_with_tokens().count();
        if let Err(err) = tree::attach(&self.root, len, body.syntax().clone().into()) {
            warn!(%err, "file root rejected a new body");
        }
        body
    }

    /// The `FILE` node at the root of the tree.
    pub fn syntax(&self) -> &SyntaxNode {
        &self.root
    }

    /// The source this file was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Append every token of the file to `to`.
    pub fn build_tokens(&self, to: &mut Tokens) {
        tree::build_tokens(&self.root, to);
    }

    pub fn tokens(&self) -> Tokens {
        tree::tokens(&self.root)
    }

    /// Write the current document to `sink`, returning the bytes written.
    pub fn write_to<W: io::Write>(&self, sink: W) -> io::Result<usize> {
        self.tokens().write_to(sink)
    }

    /// The current document as bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.tokens().bytes()
    }

    /// Whether the current document serializes to the parsed source.
    pub fn is_unchanged(&self) -> bool {
        self.root.to_string() == self.original
    }

    /// A unified diff from the parsed source to the current document.
    ///
    /// Empty when nothing changed.
    pub fn diff(&self) -> String {
        let current = self.root.to_string();
        if current == self.original {
            return String::new();
        }
        let diff = TextDiff::from_lines(self.original.as_str(), current.as_str());
        let mut unified = diff.unified_diff();
        unified.context_radius(2).header("original", "edited");
        unified.to_string()
    }

    /// An independent copy of the current document.
    ///
    /// Edits to the copy never show up in `self`, and the other way round.
    /// The copy remembers the same original source.
    pub fn snapshot(&self) -> File {
        File::from_root(tree::deep_copy(&self.root), self.original.clone())
    }
}

impl Default for File {
    fn default() -> Self {
        File::new()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl std::str::FromStr for File {
    type Err = ParseErrors;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        File::parse(source)
    }
}

impl AstNode for File {
    fn cast(node: SyntaxNode) -> Option<Self> {
        if node.kind() != SyntaxKind::FILE || node.parent().is_some() {
            return None;
        }
        let original = node.to_string();
        Some(File::from_root(node, original))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.root
    }
}
