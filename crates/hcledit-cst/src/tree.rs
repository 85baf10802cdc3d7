//! Tree navigation and the primitive structural edits.
//!
//! Every edit in this crate bottoms out in [`splice`] or [`detach`]. Each
//! performs a single rowan splice, so the text of every ancestor equals the
//! concatenation of its children both before and after the call.
//!
//! Parent links are rowan's: non-owning, and cleared when an element is
//! detached.

use std::ops::Range;

use rowan::NodeOrToken;
use tracing::debug;

use crate::error::EditError;
use crate::make;
use crate::syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode};
use crate::tokens::{Token, Tokens};

/// Append the tokens of `node` to `to`, in document order.
///
/// Composite nodes recurse into their children in order, so the result for
/// any node is the concatenation of its children's results.
pub fn build_tokens(node: &SyntaxNode, to: &mut Tokens) {
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(node) => build_tokens(&node, to),
            NodeOrToken::Token(token) => to.push(Token::from(&token)),
        }
    }
}

/// The tokens of `node` as a fresh accumulator.
pub fn tokens(node: &SyntaxNode) -> Tokens {
    let mut to = Tokens::new();
    build_tokens(node, &mut to);
    to
}

fn parent_of(element: &SyntaxElement) -> Option<SyntaxNode> {
    match element {
        NodeOrToken::Node(node) => node.parent(),
        NodeOrToken::Token(token) => token.parent(),
    }
}

/// Reject children that already have a parent or would create a cycle.
pub(crate) fn check_attachable(parent: &SyntaxNode, child: &SyntaxElement) -> Result<(), EditError> {
    if parent_of(child).is_some() {
        return Err(EditError::AlreadyAttached(child.kind()));
    }
    if let NodeOrToken::Node(node) = child {
        if parent.kind().is_leaf_node() {
            return Err(EditError::LeafParent {
                parent: parent.kind(),
                child: node.kind(),
            });
        }
        if parent.ancestors().any(|ancestor| &ancestor == node) {
            return Err(EditError::Cycle(node.kind()));
        }
    }
    Ok(())
}

/// Replace the children in `range` with `children`, in one splice.
///
/// Every new child must be detached. Removed children become detached
/// roots that can be attached elsewhere.
pub fn splice(
    parent: &SyntaxNode,
    range: Range<usize>,
    children: Vec<SyntaxElement>,
) -> Result<(), EditError> {
    let len = parent.children_with_tokens().count();
    if range.start > range.end || range.end > len {
        return Err(EditError::IndexOutOfBounds {
            index: range.start.max(range.end),
            len,
        });
    }
    for (i, child) in children.iter().enumerate() {
        check_attachable(parent, child)?;
        if children[..i].contains(child) {
            return Err(EditError::AlreadyAttached(child.kind()));
        }
    }

    debug!(
        parent = ?parent.kind(),
        removed = range.len(),
        inserted = children.len(),
        "splice"
    );
    // rowan stops removing after the first detached child, so the old
    // children are cut loose one by one before the insertion.
    let removed: Vec<SyntaxElement> = parent
        .children_with_tokens()
        .skip(range.start)
        .take(range.len())
        .collect();
    for child in removed {
        match child {
            NodeOrToken::Node(node) => node.detach(),
            NodeOrToken::Token(token) => token.detach(),
        }
    }
    parent.splice_children(range.start..range.start, children);
    Ok(())
}

/// Insert `child` into `parent` so that it becomes child number `index`.
///
/// The child must be detached. Its parent link points at `parent`
/// afterwards.
pub fn attach(parent: &SyntaxNode, index: usize, child: SyntaxElement) -> Result<(), EditError> {
    splice(parent, index..index, vec![child])
}

/// Remove `element` from its parent and clear its parent link.
///
/// Returns the former parent, or `None` if the element was already
/// detached. The removed subtree stays intact and can be attached again.
pub fn detach(element: impl Into<SyntaxElement>) -> Option<SyntaxNode> {
    let element = element.into();
    let parent = parent_of(&element)?;

    debug!(parent = ?parent.kind(), child = ?element.kind(), "detach");
    match &element {
        NodeOrToken::Node(node) => node.detach(),
        NodeOrToken::Token(token) => token.detach(),
    }
    Some(parent)
}

/// Swap `old` for `new` in `old`'s parent, in one splice.
pub fn replace_with(old: &SyntaxNode, new: SyntaxNode) -> Result<(), EditError> {
    let parent = old.parent().ok_or(EditError::Detached(old.kind()))?;
    let index = old.index();
    splice(&parent, index..index + 1, vec![new.into()])
}

/// Replace every child of `node` with `children`, in one splice.
pub fn replace_children(node: &SyntaxNode, children: Vec<SyntaxElement>) -> Result<(), EditError> {
    let len = node.children_with_tokens().count();
    splice(node, 0..len, children)
}

/// Replace the tokens of a leaf node with freshly created ones.
pub fn replace_tokens(leaf: &SyntaxNode, tokens: &Tokens) -> Result<(), EditError> {
    if !leaf.kind().is_leaf_node() {
        return Err(EditError::UnexpectedKind {
            expected: SyntaxKind::COMMENTS,
            found: leaf.kind(),
        });
    }
    replace_children(leaf, make::detached_tokens(&tokens.as_pairs()))
}

/// The root of the tree `node` currently belongs to.
pub fn root(node: &SyntaxNode) -> SyntaxNode {
    node.ancestors().last().unwrap_or_else(|| node.clone())
}

/// The nearest `BODY` strictly above `node`.
pub fn enclosing_body(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.ancestors()
        .skip(1)
        .find(|ancestor| ancestor.kind() == SyntaxKind::BODY)
}

/// Number of blocks strictly enclosing `node`.
pub fn nesting_depth(node: &SyntaxNode) -> usize {
    node.ancestors()
        .skip(1)
        .filter(|ancestor| ancestor.kind() == SyntaxKind::BLOCK)
        .count()
}

/// An independent, detached copy of `node` and everything below it.
///
/// Editing the copy never affects the original, which makes it usable as a
/// snapshot before a compound edit.
pub fn deep_copy(node: &SyntaxNode) -> SyntaxNode {
    SyntaxNode::new_root_mut(node.green().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn body_of(source: &str) -> SyntaxNode {
        let parse = parse(source);
        assert!(parse.is_ok(), "parse errors: {:?}", parse.errors());
        parse
            .syntax()
            .first_child()
            .expect("file always has a body")
    }

    fn concat_children(node: &SyntaxNode) -> String {
        node.children_with_tokens()
            .map(|child| match child {
                NodeOrToken::Node(node) => tokens(&node).text(),
                NodeOrToken::Token(token) => token.text().to_string(),
            })
            .collect()
    }

    #[test]
    fn build_tokens_concatenates_children() {
        let body = body_of("a = 1\n# note\nb {\n  c = \"x\"\n}\n");
        for node in body.descendants() {
            assert_eq!(tokens(&node).text(), concat_children(&node));
        }
        assert_eq!(tokens(&body).text(), "a = 1\n# note\nb {\n  c = \"x\"\n}\n");
    }

    #[test]
    fn detach_clears_parent() {
        let body = body_of("a = 1\nb = 2\n");
        let first = body.first_child().unwrap();
        let parent = detach(first.clone());

        assert_eq!(parent.as_ref(), Some(&body));
        assert!(first.parent().is_none());
        assert_eq!(tokens(&body).text(), "b = 2\n");
        assert_eq!(tokens(&first).text(), "a = 1\n");
        assert!(detach(first).is_none());
    }

    #[test]
    fn attach_moves_between_parents() {
        let left = body_of("a = 1\n");
        let right = body_of("b = 2\n");
        let attr = left.first_child().unwrap();

        detach(attr.clone());
        attach(&right, 1, attr.clone().into()).unwrap();

        assert_eq!(attr.parent().as_ref(), Some(&right));
        assert_eq!(tokens(&left).text(), "");
        assert_eq!(tokens(&right).text(), "b = 2\na = 1\n");
    }

    #[test]
    fn attach_rejects_attached_child() {
        let left = body_of("a = 1\n");
        let right = body_of("b = 2\n");
        let attr = left.first_child().unwrap();

        let err = attach(&right, 0, attr.into()).unwrap_err();
        assert_eq!(err, EditError::AlreadyAttached(SyntaxKind::ATTRIBUTE));
        assert_eq!(tokens(&right).text(), "b = 2\n");
    }

    #[test]
    fn attach_rejects_cycles() {
        let body = body_of("b {\n  c = 1\n}\n");
        let block = body.first_child().unwrap();
        detach(block.clone());
        let inner = block
            .children()
            .find(|n| n.kind() == SyntaxKind::BODY)
            .unwrap();

        let err = attach(&inner, 0, block.into()).unwrap_err();
        assert_eq!(err, EditError::Cycle(SyntaxKind::BLOCK));
    }

    #[test]
    fn attach_rejects_bad_index() {
        let body = body_of("a = 1\n");
        let node = make::blank_line("\n");
        let err = attach(&body, 5, node.into()).unwrap_err();
        assert_eq!(err, EditError::IndexOutOfBounds { index: 5, len: 1 });
    }

    #[test]
    fn attach_rejects_node_under_leaf() {
        let body = body_of("a = 1\n");
        let ident = body
            .descendants()
            .find(|n| n.kind() == SyntaxKind::IDENTIFIER)
            .unwrap();
        let err = attach(&ident, 0, make::blank_line("\n").into()).unwrap_err();
        assert_eq!(
            err,
            EditError::LeafParent {
                parent: SyntaxKind::IDENTIFIER,
                child: SyntaxKind::BLANK_LINE,
            }
        );
    }

    #[test]
    fn replace_with_swaps_in_place() {
        let body = body_of("a = 1\nb = 2\nc = 3\n");
        let middle = body.children().nth(1).unwrap();
        let fresh = make::blank_line("\n");

        replace_with(&middle, fresh.clone()).unwrap();

        assert!(middle.parent().is_none());
        assert_eq!(fresh.parent().as_ref(), Some(&body));
        assert_eq!(tokens(&body).text(), "a = 1\n\nc = 3\n");
    }

    #[test]
    fn replace_with_requires_parent() {
        let lonely = make::blank_line("\n");
        let err = replace_with(&lonely, make::blank_line("\n")).unwrap_err();
        assert_eq!(err, EditError::Detached(SyntaxKind::BLANK_LINE));
    }

    #[test]
    fn replace_tokens_of_leaf() {
        let body = body_of("# old\na = 1\n");
        let comments = body
            .descendants()
            .find(|n| n.kind() == SyntaxKind::COMMENTS)
            .unwrap();

        replace_tokens(&comments, &crate::tokens::lex("# new\n")).unwrap();
        assert_eq!(tokens(&body).text(), "# new\na = 1\n");
    }

    #[test]
    fn replace_tokens_of_comment_run() {
        let body = body_of("# one\n# two\na = 1\n");
        let comments = body
            .descendants()
            .find(|n| n.kind() == SyntaxKind::COMMENTS)
            .unwrap();
        assert!(comments.children_with_tokens().count() > 1);

        replace_tokens(&comments, &crate::tokens::lex("# x\n")).unwrap();
        assert_eq!(tokens(&comments).text(), "# x\n");
        assert_eq!(tokens(&body).text(), "# x\na = 1\n");
    }

    #[test]
    fn replace_children_removes_whole_range() {
        let body = body_of("a = 1\nb = 2\nc = 3\n");
        let old: Vec<SyntaxNode> = body.children().collect();
        assert_eq!(old.len(), 3);

        replace_children(&body, vec![make::blank_line("\n").into()]).unwrap();

        assert_eq!(tokens(&body).text(), "\n");
        assert_eq!(body.children_with_tokens().count(), 1);
        assert!(old.iter().all(|node| node.parent().is_none()));
    }

    #[test]
    fn splice_middle_range() {
        let body = body_of("a = 1\nb = 2\nc = 3\nd = 4\n");
        let fresh = make::blank_line("\n");

        splice(&body, 1..3, vec![fresh.into()]).unwrap();
        assert_eq!(tokens(&body).text(), "a = 1\n\nd = 4\n");
        assert_eq!(tokens(&body).text(), concat_children(&body));
    }

    #[test]
    fn splice_rejects_duplicate_children() {
        let body = body_of("a = 1\n");
        let line: SyntaxElement = make::blank_line("\n").into();

        let err = splice(&body, 0..0, vec![line.clone(), line.clone()]).unwrap_err();
        assert_eq!(err, EditError::AlreadyAttached(SyntaxKind::BLANK_LINE));
        assert_eq!(tokens(&body).text(), "a = 1\n");
        assert!(parent_of(&line).is_none());
    }

    #[test]
    fn replace_tokens_rejects_composites() {
        let body = body_of("a = 1\n");
        let err = replace_tokens(&body, &Tokens::new()).unwrap_err();
        assert!(matches!(err, EditError::UnexpectedKind { .. }));
    }

    #[test]
    fn nesting_depth_counts_blocks() {
        let body = body_of("a {\n  b {\n    c = 1\n  }\n}\n");
        let attr = body
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ATTRIBUTE)
            .unwrap();
        assert_eq!(nesting_depth(&body), 0);
        assert_eq!(nesting_depth(&attr), 2);
        assert_eq!(root(&attr).kind(), SyntaxKind::FILE);

        let inner_body = enclosing_body(&attr).unwrap();
        assert_eq!(tokens(&inner_body).text(), "    c = 1\n");
        assert_eq!(enclosing_body(&body), None);
    }

    #[test]
    fn deep_copy_is_independent() {
        let body = body_of("a = 1\nb = 2\n");
        let copy = deep_copy(&body);
        detach(copy.first_child().unwrap());

        assert_eq!(tokens(&copy).text(), "b = 2\n");
        assert_eq!(tokens(&body).text(), "a = 1\nb = 2\n");
    }
}
