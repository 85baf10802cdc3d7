//! Typed AST wrappers over CST nodes.
//!
//! These provide an ergonomic API for navigating the syntax tree while
//! still preserving access to the underlying CST. Wrappers are cheap
//! handles: cloning one clones a reference, not the subtree.
//!
//! The structural edits live in the `edit` module.

use rowan::NodeOrToken;

use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};
use crate::tokens::Tokens;
use crate::tree;
use crate::value::unescape_quoted;

/// Trait for AST nodes that wrap CST nodes.
pub trait AstNode: Sized {
    /// Try to cast a syntax node to this AST type.
    fn cast(node: SyntaxNode) -> Option<Self>;

    /// Get the underlying syntax node.
    fn syntax(&self) -> &SyntaxNode;

    /// Append this node's tokens to `to`.
    fn build_tokens(&self, to: &mut Tokens) {
        tree::build_tokens(self.syntax(), to);
    }

    fn tokens(&self) -> Tokens {
        tree::tokens(self.syntax())
    }

    /// Get the source text of this node.
    fn text(&self) -> String {
        self.syntax().to_string()
    }

    /// Whether this node currently has a parent.
    fn is_attached(&self) -> bool {
        self.syntax().parent().is_some()
    }
}

/// Macro for defining simple AST node wrappers.
macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) SyntaxNode);

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == $kind {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(
    /// Ordered attributes, blocks and trivia of a file or block.
    Body,
    SyntaxKind::BODY
);

ast_node!(
    /// `type "label" { ... }`
    Block,
    SyntaxKind::BLOCK
);

ast_node!(
    /// `name = expression`
    Attribute,
    SyntaxKind::ATTRIBUTE
);

ast_node!(
    /// The value side of an attribute.
    Expression,
    SyntaxKind::EXPRESSION
);

ast_node!(
    /// A single identifier.
    Identifier,
    SyntaxKind::IDENTIFIER
);

ast_node!(
    /// A numeric literal.
    Number,
    SyntaxKind::NUMBER
);

ast_node!(
    /// A quoted template, literal or not.
    Quoted,
    SyntaxKind::QUOTED
);

ast_node!(
    /// A heredoc template.
    Heredoc,
    SyntaxKind::HEREDOC
);

ast_node!(
    /// A run of comment lines, or one trailing comment.
    Comments,
    SyntaxKind::COMMENTS
);

ast_node!(
    /// A line with nothing but whitespace.
    BlankLine,
    SyntaxKind::BLANK_LINE
);

ast_node!(
    /// Tokens the parser could not structure.
    Unparsed,
    SyntaxKind::UNPARSED
);

/// A direct child of a [`Body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyItem {
    Attribute(Attribute),
    Block(Block),
    Comments(Comments),
    BlankLine(BlankLine),
    Unparsed(Unparsed),
}

impl BodyItem {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::ATTRIBUTE => Some(BodyItem::Attribute(Attribute(node))),
            SyntaxKind::BLOCK => Some(BodyItem::Block(Block(node))),
            SyntaxKind::COMMENTS => Some(BodyItem::Comments(Comments(node))),
            SyntaxKind::BLANK_LINE => Some(BodyItem::BlankLine(BlankLine(node))),
            SyntaxKind::UNPARSED => Some(BodyItem::Unparsed(Unparsed(node))),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            BodyItem::Attribute(it) => it.syntax(),
            BodyItem::Block(it) => it.syntax(),
            BodyItem::Comments(it) => it.syntax(),
            BodyItem::BlankLine(it) => it.syntax(),
            BodyItem::Unparsed(it) => it.syntax(),
        }
    }
}

fn tokens_of(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    node.children_with_tokens().filter_map(NodeOrToken::into_token)
}

/// Lead comments: a `COMMENTS` node in front of everything else.
fn lead_comments(node: &SyntaxNode) -> Option<Comments> {
    node.first_child().and_then(Comments::cast)
}

/// Trailing comment: a `COMMENTS` node after the item's content.
fn line_comment(node: &SyntaxNode) -> Option<Comments> {
    node.children()
        .skip(1)
        .filter(|child| child.kind() == SyntaxKind::COMMENTS)
        .last()
        .and_then(Comments::cast)
}

// === Body ===

impl Body {
    /// Every child in document order.
    pub fn items(&self) -> impl Iterator<Item = BodyItem> + use<> {
        self.0.children().filter_map(BodyItem::cast)
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        self.0.children().filter_map(Attribute::cast)
    }

    pub fn blocks(&self) -> impl Iterator<Item = Block> + use<> {
        self.0.children().filter_map(Block::cast)
    }

    /// The first attribute called `name`.
    pub fn get_attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes().find(|attr| attr.has_name(name))
    }

    /// The first block of type `ty`, whatever its labels.
    pub fn first_block_of_type(&self, ty: &str) -> Option<Block> {
        self.blocks().find(|block| block.has_type(ty))
    }

    /// The first block of type `ty` with exactly these labels.
    pub fn first_matching_block(&self, ty: &str, labels: &[&str]) -> Option<Block> {
        self.blocks().find(|block| block.matches(ty, labels))
    }

    /// All blocks of type `ty`, in document order.
    pub fn blocks_of_type<'a>(&self, ty: &'a str) -> impl Iterator<Item = Block> + use<'a> {
        self.blocks().filter(move |block| block.has_type(ty))
    }

    /// The block this body belongs to, `None` for the top-level body.
    pub fn parent_block(&self) -> Option<Block> {
        self.0.parent().and_then(Block::cast)
    }

    pub fn is_empty(&self) -> bool {
        self.0.first_child_or_token().is_none()
    }
}

// === Block ===

impl Block {
    /// The identifier naming the block type.
    pub fn type_identifier(&self) -> Option<Identifier> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn block_type(&self) -> String {
        self.type_identifier()
            .map(|ident| ident.name())
            .unwrap_or_default()
    }

    pub fn has_type(&self, ty: &str) -> bool {
        self.type_identifier()
            .is_some_and(|ident| ident.has_name(ty))
    }

    /// Label nodes between the type and the opening brace.
    pub(crate) fn label_nodes(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.0
            .children()
            .skip_while(|child| child.kind() != SyntaxKind::IDENTIFIER)
            .skip(1)
            .take_while(|child| {
                matches!(child.kind(), SyntaxKind::IDENTIFIER | SyntaxKind::QUOTED)
            })
    }

    /// Label values, unquoted and unescaped.
    ///
    /// A label that is a template rather than a literal is returned as its
    /// raw text.
    pub fn labels(&self) -> Vec<String> {
        self.label_nodes()
            .map(|node| match node.kind() {
                SyntaxKind::IDENTIFIER => Identifier(node).name(),
                _ => {
                    let quoted = Quoted(node);
                    quoted.value().unwrap_or_else(|| quoted.text())
                }
            })
            .collect()
    }

    /// Whether this block has type `ty` and exactly `labels`.
    ///
    /// Compares label text, so `"a"` and `a` both match `a`.
    pub fn matches(&self, ty: &str, labels: &[&str]) -> bool {
        if !self.has_type(ty) {
            return false;
        }
        let own = self.labels();
        own.len() == labels.len() && own.iter().zip(labels).all(|(a, b)| a == b)
    }

    /// The nested body, missing only when the header had no `{`.
    pub fn body(&self) -> Option<Body> {
        self.0.children().find_map(Body::cast)
    }

    pub fn lead_comments(&self) -> Option<Comments> {
        lead_comments(&self.0)
    }

    /// Comment on the line of the closing brace.
    pub fn line_comment(&self) -> Option<Comments> {
        let close = tokens_of(&self.0).find(|t| t.kind() == SyntaxKind::C_BRACE)?;
        close
            .siblings_with_tokens(rowan::Direction::Next)
            .filter_map(NodeOrToken::into_node)
            .find_map(Comments::cast)
    }

    pub(crate) fn open_brace(&self) -> Option<SyntaxToken> {
        tokens_of(&self.0).find(|t| t.kind() == SyntaxKind::O_BRACE)
    }

    pub(crate) fn close_brace(&self) -> Option<SyntaxToken> {
        tokens_of(&self.0).find(|t| t.kind() == SyntaxKind::C_BRACE)
    }
}

// === Attribute ===

impl Attribute {
    pub fn identifier(&self) -> Option<Identifier> {
        self.0.children().find_map(Identifier::cast)
    }

    pub fn name(&self) -> String {
        self.identifier()
            .map(|ident| ident.name())
            .unwrap_or_default()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.identifier().is_some_and(|ident| ident.has_name(name))
    }

    /// The value, missing only after a parse error.
    pub fn expression(&self) -> Option<Expression> {
        self.0.children().find_map(Expression::cast)
    }

    /// Source text of the value.
    pub fn value_text(&self) -> String {
        self.expression()
            .map(|expr| expr.text())
            .unwrap_or_default()
    }

    pub fn lead_comments(&self) -> Option<Comments> {
        lead_comments(&self.0)
    }

    /// Comment on the same line, after the value.
    pub fn line_comment(&self) -> Option<Comments> {
        line_comment(&self.0)
    }

    pub(crate) fn equals_token(&self) -> Option<SyntaxToken> {
        tokens_of(&self.0).find(|t| t.kind() == SyntaxKind::EQUAL)
    }
}

// === Expression ===

impl Expression {
    /// Children other than whitespace.
    fn significant(&self) -> Vec<NodeOrToken<SyntaxNode, SyntaxToken>> {
        self.0
            .children_with_tokens()
            .filter(|child| !child.kind().is_trivia())
            .collect()
    }

    /// The numeric value of a literal like `42` or `-1.5`.
    pub fn as_number(&self) -> Option<f64> {
        match self.significant().as_slice() {
            [NodeOrToken::Node(node)] => Number::cast(node.clone())?.as_f64(),
            [NodeOrToken::Token(minus), NodeOrToken::Node(node)]
                if minus.kind() == SyntaxKind::MINUS =>
            {
                Number::cast(node.clone())?.as_f64().map(|n| -n)
            }
            _ => None,
        }
    }

    /// The value of a quoted string without interpolations.
    pub fn as_string(&self) -> Option<String> {
        match self.significant().as_slice() {
            [NodeOrToken::Node(node)] => Quoted::cast(node.clone())?.value(),
            _ => None,
        }
    }

    /// `true` or `false`.
    pub fn as_bool(&self) -> Option<bool> {
        match self.significant().as_slice() {
            [NodeOrToken::Token(token)] if token.kind() == SyntaxKind::IDENT => {
                match token.text() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self.significant().as_slice(),
            [NodeOrToken::Token(token)] if token.kind() == SyntaxKind::IDENT && token.text() == "null"
        )
    }

    /// `a.b.c` parts, when the expression is nothing but a traversal.
    pub fn as_traversal(&self) -> Option<Vec<String>> {
        let significant = self.significant();
        let mut parts = Vec::new();
        for (i, child) in significant.iter().enumerate() {
            let token = child.as_token()?;
            let expected = if i % 2 == 0 {
                SyntaxKind::IDENT
            } else {
                SyntaxKind::DOT
            };
            if token.kind() != expected {
                return None;
            }
            if expected == SyntaxKind::IDENT {
                parts.push(token.text().to_string());
            }
        }
        (!parts.is_empty() && significant.len() % 2 == 1).then_some(parts)
    }
}

// === Leaves ===

impl Identifier {
    pub fn name(&self) -> String {
        self.text()
    }

    /// Compare the name without allocating.
    pub fn has_name(&self, name: &str) -> bool {
        self.0.text() == name
    }
}

impl Number {
    pub fn as_f64(&self) -> Option<f64> {
        self.text().parse().ok()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.text().parse().ok()
    }
}

impl Quoted {
    /// Whether the string has no interpolation or directive.
    pub fn is_literal(&self) -> bool {
        let mut tokens = tokens_of(&self.0);
        tokens.next().is_some_and(|t| t.kind() == SyntaxKind::O_QUOTE)
            && tokens.all(|t| matches!(t.kind(), SyntaxKind::QUOTED_LIT | SyntaxKind::C_QUOTE))
            && self.is_terminated()
    }

    pub fn is_terminated(&self) -> bool {
        self.0
            .last_token()
            .is_some_and(|t| t.kind() == SyntaxKind::C_QUOTE)
    }

    /// The unescaped value of a literal string.
    pub fn value(&self) -> Option<String> {
        if !self.is_literal() {
            return None;
        }
        let raw: String = tokens_of(&self.0)
            .filter(|t| t.kind() == SyntaxKind::QUOTED_LIT)
            .map(|t| t.text().to_string())
            .collect();
        unescape_quoted(&raw)
    }
}

impl Heredoc {
    /// The delimiter word, without `<<` or `<<-`.
    pub fn delimiter(&self) -> Option<String> {
        let opener = self.0.first_token()?;
        let rest = opener.text().strip_prefix("<<")?;
        let rest = rest.strip_prefix('-').unwrap_or(rest);
        Some(rest.trim_end().to_string())
    }

    /// Whether this is an indented `<<-` heredoc.
    pub fn is_indented(&self) -> bool {
        self.0
            .first_token()
            .is_some_and(|t| t.text().starts_with("<<-"))
    }

    /// Raw template text between the opener and closing delimiter.
    pub fn content(&self) -> String {
        let mut tokens = tokens_of(&self.0);
        tokens.next();
        tokens
            .filter(|t| t.kind() != SyntaxKind::C_HEREDOC)
            .map(|t| t.text().to_string())
            .collect()
    }
}

impl Comments {
    /// Each comment's text, markers included.
    pub fn lines(&self) -> Vec<String> {
        tokens_of(&self.0)
            .filter(|t| t.kind() == SyntaxKind::COMMENT)
            .map(|t| t.text().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn body(source: &str) -> Body {
        let p = parse(source);
        assert!(p.is_ok(), "parse errors: {:?}", p.errors());
        p.syntax().first_child().and_then(Body::cast).unwrap()
    }

    #[test]
    fn test_body_queries() {
        let body = body("a = 1\nb = 2\nsvc \"x\" {}\nsvc \"y\" {}\nother {}\na = 3\n");
        assert_eq!(body.attributes().count(), 3);
        assert_eq!(body.blocks().count(), 3);
        assert_eq!(body.get_attribute("a").unwrap().value_text(), "1");
        assert!(body.get_attribute("missing").is_none());
        assert_eq!(body.first_block_of_type("svc").unwrap().labels(), vec!["x"]);
        assert_eq!(
            body.first_matching_block("svc", &["y"]).unwrap().labels(),
            vec!["y"]
        );
        assert!(body.first_matching_block("svc", &["z"]).is_none());
        assert_eq!(body.blocks_of_type("svc").count(), 2);
    }

    #[test]
    fn test_first_match_wins() {
        let body = body("svc \"a\" {}\nsvc \"b\" {}\n");
        assert_eq!(body.first_block_of_type("svc").unwrap().labels(), vec!["a"]);
    }

    #[test]
    fn test_block_labels() {
        let body = body("resource aws_instance \"web \\\"1\\\"\" {\n}\n");
        let block = body.blocks().next().unwrap();
        assert_eq!(block.block_type(), "resource");
        assert_eq!(block.labels(), vec!["aws_instance", "web \"1\""]);
        assert!(block.matches("resource", &["aws_instance", "web \"1\""]));
        assert!(!block.matches("resource", &["aws_instance"]));
        assert!(!block.matches("data", &["aws_instance", "web \"1\""]));
        assert!(block.body().unwrap().is_empty());
    }

    #[test]
    fn test_items_in_order() {
        let body = body("# c\n\na = 1\nb {}\n");
        let kinds: Vec<_> = body.items().map(|item| item.syntax().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::COMMENTS,
                SyntaxKind::BLANK_LINE,
                SyntaxKind::ATTRIBUTE,
                SyntaxKind::BLOCK,
            ]
        );
    }

    #[test]
    fn test_attribute_comments() {
        let body = body("# one\n# two\nname = \"x\" # note\n");
        let attr = body.get_attribute("name").unwrap();
        assert_eq!(attr.lead_comments().unwrap().lines(), vec!["# one", "# two"]);
        assert_eq!(attr.line_comment().unwrap().lines(), vec!["# note"]);
        assert_eq!(attr.value_text(), "\"x\"");
    }

    #[test]
    fn test_attribute_without_comments() {
        let body = body("name = 1\n");
        let attr = body.get_attribute("name").unwrap();
        assert!(attr.lead_comments().is_none());
        assert!(attr.line_comment().is_none());
    }

    #[test]
    fn test_block_comments() {
        let body = body("// lead\nb {\n} # after\n");
        let block = body.blocks().next().unwrap();
        assert_eq!(block.lead_comments().unwrap().lines(), vec!["// lead"]);
        assert_eq!(block.line_comment().unwrap().lines(), vec!["# after"]);
    }

    #[test]
    fn test_expression_literals() {
        let body = body(
            "n = 42\nneg = -1.5\ns = \"a\\tb\"\nt = \"${x}\"\nyes = true\nnothing = null\nref = var.region\n",
        );
        let expr = |name: &str| body.get_attribute(name).unwrap().expression().unwrap();

        assert_eq!(expr("n").as_number(), Some(42.0));
        assert_eq!(expr("neg").as_number(), Some(-1.5));
        assert_eq!(expr("s").as_string().as_deref(), Some("a\tb"));
        assert_eq!(expr("t").as_string(), None);
        assert_eq!(expr("s").as_number(), None);
        assert_eq!(expr("yes").as_bool(), Some(true));
        assert!(expr("nothing").is_null());
        assert_eq!(
            expr("ref").as_traversal(),
            Some(vec!["var".to_string(), "region".to_string()])
        );
        assert_eq!(expr("n").as_traversal(), None);
    }

    #[test]
    fn test_number_leaf() {
        let body = body("a = 12\n");
        let number = body
            .syntax()
            .descendants()
            .find_map(Number::cast)
            .unwrap();
        assert_eq!(number.as_i64(), Some(12));
        assert_eq!(number.as_f64(), Some(12.0));
    }

    #[test]
    fn test_heredoc() {
        let body = body("s = <<-EOT\n  hello\n  EOT\n");
        let heredoc = body
            .syntax()
            .descendants()
            .find_map(Heredoc::cast)
            .unwrap();
        assert_eq!(heredoc.delimiter().as_deref(), Some("EOT"));
        assert!(heredoc.is_indented());
        assert_eq!(heredoc.content(), "  hello\n");
    }

    #[test]
    fn test_build_tokens_matches_text() {
        let body = body("a = 1 # x\nb {\n  c = [1, 2]\n}\n");
        for item in body.items() {
            let mut tokens = Tokens::new();
            match &item {
                BodyItem::Attribute(attr) => attr.build_tokens(&mut tokens),
                BodyItem::Block(block) => block.build_tokens(&mut tokens),
                _ => {}
            }
            assert_eq!(tokens.text(), item.syntax().to_string());
        }
    }
}
