//! Layout options for synthesized tokens.
//!
//! Parsed tokens are never re-laid-out. These options only decide how new
//! attributes, blocks and values look when an edit creates them.

use rowan::NodeOrToken;

use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use crate::tree;

/// Line terminator used for synthesized lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Options for synthesized layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Indentation unit per nesting level (default: two spaces)
    pub indent: String,

    /// Line terminator (default: `\n`)
    pub line_ending: LineEnding,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            line_ending: LineEnding::Lf,
        }
    }
}

impl Style {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom indentation unit.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Set the line terminator.
    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn newline(&self) -> &'static str {
        self.line_ending.as_str()
    }

    /// Indentation for an item nested inside `depth` blocks.
    pub fn indent_for(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }

    /// Infer the style of the document containing `node`.
    ///
    /// The line ending comes from the first newline in the document and the
    /// indentation unit from the first item nested one block deep. Anything
    /// not found falls back to the default.
    pub fn detect(node: &SyntaxNode) -> Self {
        let root = tree::root(node);
        let mut style = Style::default();

        let first_newline = root
            .descendants_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|token| token.kind() == SyntaxKind::NEWLINE);
        if let Some(token) = first_newline
            && token.text() == "\r\n"
        {
            style.line_ending = LineEnding::CrLf;
        }

        let nested_item = root.descendants().find(|node| {
            matches!(node.kind(), SyntaxKind::ATTRIBUTE | SyntaxKind::BLOCK)
                && tree::nesting_depth(node) == 1
                && starts_line(node)
        });
        if let Some(item) = nested_item
            && let Some(indent) = leading_whitespace(&item)
        {
            style.indent = indent;
        }

        style
    }
}

/// Whether `item` begins right after a newline, as opposed to sitting inside
/// a single-line block.
fn starts_line(item: &SyntaxNode) -> bool {
    item.first_token()
        .and_then(|token| token.prev_token())
        .is_some_and(|token| token.kind() == SyntaxKind::NEWLINE)
}

/// Whitespace before the first significant token of an item, skipping its
/// lead comments.
fn leading_whitespace(item: &SyntaxNode) -> Option<String> {
    let first = item
        .children_with_tokens()
        .find(|child| child.kind() != SyntaxKind::COMMENTS)?;
    match first {
        NodeOrToken::Token(token) if token.kind() == SyntaxKind::WHITESPACE => {
            Some(token.text().to_string())
        }
        _ => None,
    }
}
