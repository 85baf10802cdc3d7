//! Constructors for synthesized, detached subtrees.
//!
//! Everything returned here is a fresh mutable root (or a list of
//! parentless elements) ready to be attached with the functions in
//! [`crate::tree`].

use rowan::{GreenNodeBuilder, NodeOrToken};

use crate::ast::Body;
use crate::syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode};
use crate::tokens::Tokens;
use crate::value::escape_quoted;

type Builder = GreenNodeBuilder<'static>;

fn build(kind: SyntaxKind, f: impl FnOnce(&mut Builder)) -> SyntaxNode {
    let mut builder = Builder::new();
    builder.start_node(kind.into());
    f(&mut builder);
    builder.finish_node();
    SyntaxNode::new_root_mut(builder.finish())
}

fn token(builder: &mut Builder, kind: SyntaxKind, text: &str) {
    builder.token(kind.into(), text);
}

fn node(builder: &mut Builder, kind: SyntaxKind, f: impl FnOnce(&mut Builder)) {
    builder.start_node(kind.into());
    f(builder);
    builder.finish_node();
}

/// Build children inside a throwaway holder, then cut them loose.
fn detached_children(f: impl FnOnce(&mut Builder)) -> Vec<SyntaxElement> {
    let holder = build(SyntaxKind::UNPARSED, f);
    let children: Vec<SyntaxElement> = holder.children_with_tokens().collect();
    for child in &children {
        match child {
            NodeOrToken::Node(node) => node.detach(),
            NodeOrToken::Token(token) => token.detach(),
        }
    }
    children
}

/// Parentless tokens, in order.
pub(crate) fn detached_tokens(pairs: &[(SyntaxKind, &str)]) -> Vec<SyntaxElement> {
    detached_children(|b| {
        for &(kind, text) in pairs {
            token(b, kind, text);
        }
    })
}

/// A single parentless token.
pub(crate) fn detached_token(kind: SyntaxKind, text: &str) -> Vec<SyntaxElement> {
    detached_tokens(&[(kind, text)])
}

/// Index one past the template closer matching the opener at `start`.
fn template_end(pairs: &[(SyntaxKind, &str)], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, &(kind, _)) in pairs[start..].iter().enumerate() {
        match kind {
            SyntaxKind::O_QUOTE | SyntaxKind::O_HEREDOC => depth += 1,
            SyntaxKind::C_QUOTE | SyntaxKind::C_HEREDOC => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return start + offset + 1;
                }
            }
            _ => {}
        }
    }
    pairs.len()
}

/// Emit expression tokens, grouping literals into leaf nodes.
///
/// Numbers become `NUMBER`, quoted templates `QUOTED` and heredocs
/// `HEREDOC`. Everything else stays a bare token of the enclosing node.
pub(crate) fn expression_into(builder: &mut Builder, pairs: &[(SyntaxKind, &str)]) {
    let mut index = 0;
    while index < pairs.len() {
        let (kind, text) = pairs[index];
        match kind {
            SyntaxKind::NUMBER_LIT => {
                node(builder, SyntaxKind::NUMBER, |b| token(b, kind, text));
                index += 1;
            }
            SyntaxKind::O_QUOTE | SyntaxKind::O_HEREDOC => {
                let end = template_end(pairs, index);
                let leaf = if kind == SyntaxKind::O_QUOTE {
                    SyntaxKind::QUOTED
                } else {
                    SyntaxKind::HEREDOC
                };
                node(builder, leaf, |b| {
                    for &(kind, text) in &pairs[index..end] {
                        token(b, kind, text);
                    }
                });
                index = end;
            }
            _ => {
                token(builder, kind, text);
                index += 1;
            }
        }
    }
}

pub fn expression(value: &Tokens) -> SyntaxNode {
    build(SyntaxKind::EXPRESSION, |b| expression_into(b, &value.as_pairs()))
}

pub fn identifier(name: &str) -> SyntaxNode {
    build(SyntaxKind::IDENTIFIER, |b| token(b, SyntaxKind::IDENT, name))
}

fn quoted_into(builder: &mut Builder, value: &str) {
    node(builder, SyntaxKind::QUOTED, |b| {
        token(b, SyntaxKind::O_QUOTE, "\"");
        if !value.is_empty() {
            token(b, SyntaxKind::QUOTED_LIT, &escape_quoted(value));
        }
        token(b, SyntaxKind::C_QUOTE, "\"");
    });
}

/// A quoted string literal holding `value`, escaped as needed.
pub fn quoted(value: &str) -> SyntaxNode {
    let mut builder = Builder::new();
    quoted_into(&mut builder, value);
    SyntaxNode::new_root_mut(builder.finish())
}

/// `<indent>name = <value><newline>`
pub fn attribute(name: &str, value: &Tokens, indent: &str, newline: &str) -> SyntaxNode {
    build(SyntaxKind::ATTRIBUTE, |b| {
        if !indent.is_empty() {
            token(b, SyntaxKind::WHITESPACE, indent);
        }
        node(b, SyntaxKind::IDENTIFIER, |b| {
            token(b, SyntaxKind::IDENT, name)
        });
        token(b, SyntaxKind::WHITESPACE, " ");
        token(b, SyntaxKind::EQUAL, "=");
        token(b, SyntaxKind::WHITESPACE, " ");
        node(b, SyntaxKind::EXPRESSION, |b| {
            expression_into(b, &value.as_pairs())
        });
        token(b, SyntaxKind::NEWLINE, newline);
    })
}

/// `<indent>ty "label" ... {<newline><indent>}<newline>` with an empty body.
pub fn block(ty: &str, labels: &[&str], indent: &str, newline: &str) -> SyntaxNode {
    build(SyntaxKind::BLOCK, |b| {
        if !indent.is_empty() {
            token(b, SyntaxKind::WHITESPACE, indent);
        }
        node(b, SyntaxKind::IDENTIFIER, |b| token(b, SyntaxKind::IDENT, ty));
        labels_into(b, labels);
        token(b, SyntaxKind::WHITESPACE, " ");
        token(b, SyntaxKind::O_BRACE, "{");
        token(b, SyntaxKind::NEWLINE, newline);
        node(b, SyntaxKind::BODY, |_| {});
        if !indent.is_empty() {
            token(b, SyntaxKind::WHITESPACE, indent);
        }
        token(b, SyntaxKind::C_BRACE, "}");
        token(b, SyntaxKind::NEWLINE, newline);
    })
}

fn labels_into(builder: &mut Builder, labels: &[&str]) {
    for label in labels {
        token(builder, SyntaxKind::WHITESPACE, " ");
        quoted_into(builder, label);
    }
}

/// Parentless ` "label"` pairs, as they sit between a block type and `{`.
pub(crate) fn detached_labels(labels: &[&str]) -> Vec<SyntaxElement> {
    detached_children(|b| labels_into(b, labels))
}

/// A `BODY` with no children.
pub(crate) fn empty_body() -> Body {
    Body(build(SyntaxKind::BODY, |_| {}))
}

pub fn blank_line(newline: &str) -> SyntaxNode {
    build(SyntaxKind::BLANK_LINE, |b| {
        token(b, SyntaxKind::NEWLINE, newline)
    })
}
