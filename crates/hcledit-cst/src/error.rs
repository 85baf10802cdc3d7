//! Structural edit errors.

use crate::syntax_kind::SyntaxKind;

/// A structural edit that would break the tree's invariants.
///
/// These are caller mistakes; the tree is left untouched when one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The element already has a parent. Detach it first.
    #[error("{0:?} is already attached to a tree")]
    AlreadyAttached(SyntaxKind),

    /// The element would become its own ancestor.
    #[error("cannot attach {0:?} inside its own subtree")]
    Cycle(SyntaxKind),

    /// The node has no parent to be replaced within.
    #[error("{0:?} is not attached to a tree")]
    Detached(SyntaxKind),

    #[error("child index {index} is out of bounds for a node with {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Leaf nodes hold tokens only.
    #[error("cannot attach node {child:?} to leaf node {parent:?}")]
    LeafParent {
        parent: SyntaxKind,
        child: SyntaxKind,
    },

    /// A typed operation was given a node of the wrong kind.
    #[error("expected {expected:?}, found {found:?}")]
    UnexpectedKind {
        expected: SyntaxKind,
        found: SyntaxKind,
    },

    /// The node lacks a token the edit anchors on, e.g. a block without `{`.
    #[error("{node:?} has no {missing:?} token")]
    MissingToken {
        node: SyntaxKind,
        missing: SyntaxKind,
    },
}
