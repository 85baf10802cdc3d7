//! Structural edits on bodies, blocks and attributes.
//!
//! Edits touch only the nodes they are about. Everything else keeps its
//! tokens, so an unchanged region serializes to the same bytes as before.
//!
//! New attributes and blocks land right after the last attribute or block
//! of a body when the body ends in a comment run, keeping that run last.
//! Otherwise they land at the very end. Synthesized layout follows the
//! [`Style`] detected from the document unless one is passed explicitly.

use rowan::NodeOrToken;
use tracing::debug;

use crate::ast::{AstNode, Attribute, Block, Body};
use crate::error::EditError;
use crate::make;
use crate::style::Style;
use crate::syntax_kind::{SyntaxElement, SyntaxKind, SyntaxNode};
use crate::tokens::Tokens;
use crate::tree;
use crate::value::{Value, tokens_for_value_at};

// === Body ===

impl Body {
    /// Set the value of attribute `name`, creating it if needed.
    ///
    /// An existing attribute keeps its comments and position; only its
    /// expression is replaced.
    pub fn set_attribute_value(&self, name: &str, value: &Value) -> Result<Attribute, EditError> {
        self.set_attribute_value_with_style(name, value, &Style::detect(&self.0))
    }

    pub fn set_attribute_value_with_style(
        &self,
        name: &str,
        value: &Value,
        style: &Style,
    ) -> Result<Attribute, EditError> {
        let depth = tree::nesting_depth(&self.0);
        let tokens = tokens_for_value_at(value, style, depth);
        self.set_attribute_raw_with_style(name, &tokens, style)
    }

    /// Set the expression of attribute `name` to raw `tokens`, creating the
    /// attribute if needed.
    pub fn set_attribute_raw(&self, name: &str, tokens: &Tokens) -> Result<Attribute, EditError> {
        self.set_attribute_raw_with_style(name, tokens, &Style::detect(&self.0))
    }

    pub fn set_attribute_raw_with_style(
        &self,
        name: &str,
        tokens: &Tokens,
        style: &Style,
    ) -> Result<Attribute, EditError> {
        if let Some(attr) = self.get_attribute(name) {
            attr.set_raw(tokens)?;
            return Ok(attr);
        }

        let indent = style.indent_for(tree::nesting_depth(&self.0));
        let node = make::attribute(name, tokens, &indent, style.newline());
        insert_item(self, &node, style)?;
        Ok(Attribute(node))
    }

    /// Move a detached attribute to the end of this body.
    ///
    /// The attribute keeps its own tokens, indentation included.
    pub fn append_attribute(&self, attr: &Attribute) -> Result<(), EditError> {
        insert_item(self, &attr.0, &Style::detect(&self.0))
    }

    /// Move a detached block to the end of this body.
    ///
    /// The block keeps its own tokens, indentation included.
    pub fn append_block(&self, block: &Block) -> Result<(), EditError> {
        insert_item(self, &block.0, &Style::detect(&self.0))
    }

    /// Create an empty block and append it.
    pub fn append_new_block(&self, ty: &str, labels: &[&str]) -> Result<Block, EditError> {
        self.append_new_block_with_style(ty, labels, &Style::detect(&self.0))
    }

    pub fn append_new_block_with_style(
        &self,
        ty: &str,
        labels: &[&str],
        style: &Style,
    ) -> Result<Block, EditError> {
        let indent = style.indent_for(tree::nesting_depth(&self.0));
        let node = make::block(ty, labels, &indent, style.newline());
        insert_item(self, &node, style)?;
        Ok(Block(node))
    }

    /// Append an empty line, typically to separate blocks.
    pub fn append_newline(&self) -> Result<(), EditError> {
        let style = Style::detect(&self.0);
        insert_item(self, &make::blank_line(style.newline()), &style)
    }

    /// Detach the first attribute called `name`, with its comments.
    pub fn remove_attribute(&self, name: &str) -> Option<Attribute> {
        let attr = self.get_attribute(name)?;
        tree::detach(attr.0.clone());
        Some(attr)
    }

    /// Detach `block` if it is a direct child of this body.
    pub fn remove_block(&self, block: &Block) -> bool {
        if block.0.parent().as_ref() != Some(&self.0) {
            return false;
        }
        tree::detach(block.0.clone());
        true
    }

    /// Remove everything: attributes, blocks, comments and blank lines.
    pub fn clear(&self) {
        let children: Vec<SyntaxElement> = self.0.children_with_tokens().collect();
        debug!(removed = children.len(), "clear body");
        for child in children {
            tree::detach(child);
        }
    }
}

fn is_item(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ATTRIBUTE | SyntaxKind::BLOCK | SyntaxKind::UNPARSED
    )
}

/// Child index at which a new item goes.
fn insertion_index(body: &SyntaxNode) -> usize {
    let children: Vec<SyntaxElement> = body.children_with_tokens().collect();
    let last_item = children.iter().rposition(|child| is_item(child.kind()));
    let Some(last_item) = last_item else {
        return children.len();
    };
    let trailing_comments = children[last_item + 1..]
        .iter()
        .any(|child| child.kind() == SyntaxKind::COMMENTS);
    if trailing_comments {
        last_item + 1
    } else {
        children.len()
    }
}

fn ends_with_newline(node: &SyntaxNode) -> bool {
    node.last_token()
        .is_some_and(|token| token.kind() == SyntaxKind::NEWLINE)
}

/// Append a newline token to `node` unless it already ends in one.
fn terminate_line(node: &SyntaxNode, style: &Style) -> Result<(), EditError> {
    if node.first_token().is_none() || ends_with_newline(node) {
        return Ok(());
    }
    let len = node.children_with_tokens().count();
    tree::splice(
        node,
        len..len,
        make::detached_token(SyntaxKind::NEWLINE, style.newline()),
    )
}

fn insert_item(body: &Body, item: &SyntaxNode, style: &Style) -> Result<(), EditError> {
    tree::check_attachable(&body.0, &item.clone().into())?;

    if let Some(block) = body.parent_block()
        && !block.is_multiline()
    {
        block.expand(style)?;
    }

    let index = insertion_index(&body.0);
    if index > 0
        && let Some(NodeOrToken::Node(previous)) = body.0.children_with_tokens().nth(index - 1)
    {
        terminate_line(&previous, style)?;
    }
    terminate_line(item, style)?;

    debug!(kind = ?item.kind(), index, "insert body item");
    tree::attach(&body.0, index, item.clone().into())
}

// === Block ===

impl Block {
    /// Rename the block type.
    pub fn set_type(&self, ty: &str) -> Result<(), EditError> {
        let ident = self.type_identifier().ok_or(EditError::MissingToken {
            node: SyntaxKind::BLOCK,
            missing: SyntaxKind::IDENTIFIER,
        })?;
        tree::replace_with(ident.syntax(), make::identifier(ty))
    }

    /// Replace all labels with quoted `labels`.
    ///
    /// The header is rewritten from the type to the opening brace with
    /// single spaces between parts.
    pub fn set_labels(&self, labels: &[&str]) -> Result<(), EditError> {
        let ident = self.type_identifier().ok_or(EditError::MissingToken {
            node: SyntaxKind::BLOCK,
            missing: SyntaxKind::IDENTIFIER,
        })?;
        let brace = self.open_brace().ok_or(EditError::MissingToken {
            node: SyntaxKind::BLOCK,
            missing: SyntaxKind::O_BRACE,
        })?;

        let mut header = make::detached_labels(labels);
        header.extend(make::detached_token(SyntaxKind::WHITESPACE, " "));
        tree::splice(&self.0, ident.syntax().index() + 1..brace.index(), header)
    }

    /// Whether the body starts on its own line.
    pub fn is_multiline(&self) -> bool {
        self.0
            .children_with_tokens()
            .skip_while(|child| child.kind() != SyntaxKind::O_BRACE)
            .take_while(|child| child.kind() != SyntaxKind::BODY)
            .any(|child| child.kind() == SyntaxKind::NEWLINE)
    }

    /// Turn `{ a = 1 }` into a block with its body on separate lines.
    fn expand(&self, style: &Style) -> Result<(), EditError> {
        let (Some(open), Some(body), Some(close)) =
            (self.open_brace(), self.body(), self.close_brace())
        else {
            return Err(EditError::MissingToken {
                node: SyntaxKind::BLOCK,
                missing: SyntaxKind::C_BRACE,
            });
        };
        let depth = tree::nesting_depth(&self.0);
        let inner = style.indent_for(depth + 1);
        let outer = style.indent_for(depth);
        debug!(depth, "expand single-line block");

        // Between the body and the closing brace: only the outer indent.
        let mut closing = Vec::new();
        if !outer.is_empty() {
            closing.extend(make::detached_token(SyntaxKind::WHITESPACE, &outer));
        }
        tree::splice(&self.0, body.syntax().index() + 1..close.index(), closing)?;

        for item in body.syntax().children() {
            indent_line(&item, &inner)?;
            terminate_line(&item, style)?;
        }

        // Between the opening brace and the body: just a newline.
        tree::splice(
            &self.0,
            open.index() + 1..body.syntax().index(),
            make::detached_token(SyntaxKind::NEWLINE, style.newline()),
        )
    }
}

/// Set the leading whitespace of an item to `indent`.
fn indent_line(item: &SyntaxNode, indent: &str) -> Result<(), EditError> {
    let leading = match item.first_child_or_token() {
        Some(NodeOrToken::Token(token)) if token.kind() == SyntaxKind::WHITESPACE => 1,
        _ => 0,
    };
    let replacement = if indent.is_empty() {
        Vec::new()
    } else {
        make::detached_token(SyntaxKind::WHITESPACE, indent)
    };
    tree::splice(item, 0..leading, replacement)
}

// === Attribute ===

impl Attribute {
    /// Replace the expression with the tokens for `value`.
    pub fn set_value(&self, value: &Value) -> Result<(), EditError> {
        let style = Style::detect(&self.0);
        let depth = tree::nesting_depth(&self.0);
        self.set_raw(&tokens_for_value_at(value, &style, depth))
    }

    /// Replace the expression with raw `tokens`.
    ///
    /// Comments around the attribute are left alone.
    pub fn set_raw(&self, tokens: &Tokens) -> Result<(), EditError> {
        let expression = make::expression(tokens);
        if let Some(old) = self.expression() {
            return tree::replace_with(old.syntax(), expression);
        }

        let equals = self.equals_token().ok_or(EditError::MissingToken {
            node: SyntaxKind::ATTRIBUTE,
            missing: SyntaxKind::EQUAL,
        })?;
        let mut index = equals.index() + 1;
        let mut children: Vec<SyntaxElement> = Vec::new();
        let mut next = equals.next_sibling_or_token();
        if next.as_ref().is_some_and(|n| n.kind() == SyntaxKind::WHITESPACE) {
            index += 1;
            next = next.and_then(|n| n.next_sibling_or_token());
        } else {
            children.extend(make::detached_token(SyntaxKind::WHITESPACE, " "));
        }
        children.push(expression.into());
        // A trailing comment keeps its distance from the new expression.
        if next.is_some_and(|n| matches!(n.kind(), SyntaxKind::COMMENTS | SyntaxKind::COMMENT))
        {
            children.extend(make::detached_token(SyntaxKind::WHITESPACE, " "));
        }
        tree::splice(&self.0, index..index, children)
    }

    /// Rename the attribute.
    pub fn set_name(&self, name: &str) -> Result<(), EditError> {
        let ident = self.identifier().ok_or(EditError::MissingToken {
            node: SyntaxKind::ATTRIBUTE,
            missing: SyntaxKind::IDENTIFIER,
        })?;
        tree::replace_with(ident.syntax(), make::identifier(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::tokens::lex;

    fn body(source: &str) -> Body {
        let p = parse(source);
        assert!(p.is_ok(), "parse errors: {:?}", p.errors());
        p.syntax().first_child().and_then(Body::cast).unwrap()
    }

    fn root_text(body: &Body) -> String {
        tree::root(body.syntax()).to_string()
    }

    #[test]
    fn set_existing_attribute_keeps_comments() {
        let body = body("# lead\nname = \"old\" # keep\nother = 1\n");
        body.set_attribute_value("name", &"new".into()).unwrap();
        assert_eq!(root_text(&body), "# lead\nname = \"new\" # keep\nother = 1\n");
    }

    #[test]
    fn set_missing_attribute_appends() {
        let body = body("a = 1\n");
        let attr = body.set_attribute_value("b", &Value::Bool(true)).unwrap();
        assert_eq!(root_text(&body), "a = 1\nb = true\n");
        assert!(attr.is_attached());
        assert_eq!(attr.name(), "b");
    }

    #[test]
    fn set_attribute_on_file_without_trailing_newline() {
        let body = body("a = 1");
        body.set_attribute_value("b", &Value::Int(2)).unwrap();
        assert_eq!(root_text(&body), "a = 1\nb = 2\n");
    }

    #[test]
    fn set_attribute_raw() {
        let body = body("region = \"x\"\n");
        body.set_attribute_raw("region", &crate::value::tokens_for_traversal(&["var", "region"]))
            .unwrap();
        body.set_attribute_raw("count", &lex("length(var.list)")).unwrap();
        assert_eq!(
            root_text(&body),
            "region = var.region\ncount = length(var.list)\n"
        );
    }

    #[test]
    fn set_value_fills_missing_expression() {
        let p = parse("a =\nb = 2\n");
        let root = p.syntax();
        let body = root.first_child().and_then(Body::cast).unwrap();
        body.set_attribute_value("a", &Value::Int(1)).unwrap();
        assert_eq!(root.to_string(), "a = 1\nb = 2\n");
    }

    #[test]
    fn set_value_keeps_space_before_comment() {
        let p = parse("a = # c\nb =# d\n");
        let root = p.syntax();
        let body = root.first_child().and_then(Body::cast).unwrap();
        body.set_attribute_value("a", &Value::Int(1)).unwrap();
        body.set_attribute_value("b", &Value::Int(2)).unwrap();
        assert_eq!(root.to_string(), "a = 1 # c\nb = 2 # d\n");
    }

    #[test]
    fn nested_attributes_are_indented() {
        let body = body("svc {\n    port = 80\n}\n");
        let inner = body.blocks().next().unwrap().body().unwrap();
        inner
            .set_attribute_value(
                "tags",
                &Value::Object(vec![("env".to_string(), "prod".into())]),
            )
            .unwrap();
        assert_eq!(
            root_text(&body),
            "svc {\n    port = 80\n    tags = {\n        env = \"prod\"\n    }\n}\n"
        );
    }

    #[test]
    fn new_items_go_before_trailing_comments() {
        let body = body("a = 1\n\n# end of file\n");
        body.set_attribute_value("b", &Value::Int(2)).unwrap();
        assert_eq!(root_text(&body), "a = 1\nb = 2\n\n# end of file\n");
    }

    #[test]
    fn new_items_go_after_trailing_blank_lines() {
        let body = body("a = 1\n");
        body.append_newline().unwrap();
        body.append_new_block("b", &[]).unwrap();
        assert_eq!(root_text(&body), "a = 1\n\nb {\n}\n");
    }

    #[test]
    fn new_items_in_comment_only_body_go_last() {
        let body = body("# header\n");
        body.set_attribute_value("a", &Value::Int(1)).unwrap();
        assert_eq!(root_text(&body), "# header\na = 1\n");
    }

    #[test]
    fn append_new_block_in_nested_body() {
        let body = body("outer {\n  x = 1\n}\n");
        let inner = body.blocks().next().unwrap().body().unwrap();
        let block = inner.append_new_block("inner", &["l"]).unwrap();
        block.body().unwrap().set_attribute_value("y", &Value::Int(2)).unwrap();
        assert_eq!(
            root_text(&body),
            "outer {\n  x = 1\n  inner \"l\" {\n    y = 2\n  }\n}\n"
        );
    }

    #[test]
    fn inserting_into_single_line_block_expands_it() {
        let body = body("a { b = 1 }\nc {}\n");
        let mut blocks = body.blocks();
        let a = blocks.next().unwrap();
        let c = blocks.next().unwrap();

        a.body().unwrap().set_attribute_value("d", &Value::Int(2)).unwrap();
        c.body().unwrap().set_attribute_value("e", &Value::Int(3)).unwrap();

        assert_eq!(
            root_text(&body),
            "a {\n  b = 1\n  d = 2\n}\nc {\n  e = 3\n}\n"
        );
        assert!(a.is_multiline());
    }

    #[test]
    fn remove_attribute_takes_its_comments() {
        let body = body("# about a\na = 1 # trailing\n\nb = 2\n");
        let removed = body.remove_attribute("a").unwrap();
        assert!(!removed.is_attached());
        assert_eq!(removed.text(), "# about a\na = 1 # trailing\n");
        assert_eq!(root_text(&body), "\nb = 2\n");
        assert!(body.remove_attribute("a").is_none());
    }

    #[test]
    fn remove_block_checks_membership() {
        let body = body("a {}\nb {\n  c {}\n}\n");
        let b = body.first_block_of_type("b").unwrap();
        let c = b.body().unwrap().blocks().next().unwrap();

        assert!(!body.remove_block(&c));
        assert!(body.remove_block(&b));
        assert!(!body.remove_block(&b));
        assert_eq!(root_text(&body), "a {}\n");
    }

    #[test]
    fn clear_removes_everything() {
        let body = body("# c\na = 1\n\nb {}\n");
        body.clear();
        assert!(body.is_empty());
        assert_eq!(root_text(&body), "");
    }

    #[test]
    fn move_block_between_bodies() {
        let source = body("keep = 1\nmoved \"x\" {\n  v = 1\n}\n");
        let target = body("t = 0\n");
        let block = source.first_block_of_type("moved").unwrap();

        assert!(source.remove_block(&block));
        target.append_block(&block).unwrap();

        assert_eq!(root_text(&source), "keep = 1\n");
        assert_eq!(root_text(&target), "t = 0\nmoved \"x\" {\n  v = 1\n}\n");
        assert_eq!(block.syntax().parent().as_ref(), Some(target.syntax()));
    }

    #[test]
    fn append_rejects_attached_items() {
        let left = body("a = 1\n");
        let right = body("b = 2\n");
        let attr = left.get_attribute("a").unwrap();

        assert_eq!(
            right.append_attribute(&attr),
            Err(EditError::AlreadyAttached(SyntaxKind::ATTRIBUTE))
        );
        assert_eq!(root_text(&right), "b = 2\n");
    }

    #[test]
    fn append_rejects_cycles() {
        let outer = body("a {\n  b = 1\n}\n");
        let block = outer.blocks().next().unwrap();
        outer.remove_block(&block);
        let inner = block.body().unwrap();

        assert_eq!(
            inner.append_block(&block),
            Err(EditError::Cycle(SyntaxKind::BLOCK))
        );
        assert_eq!(block.text(), "a {\n  b = 1\n}\n");
    }

    #[test]
    fn moved_attribute_without_newline_is_terminated() {
        let left = body("x = 1\nlast = true");
        let right = body("");
        let attr = left.remove_attribute("last").unwrap();
        right.append_attribute(&attr).unwrap();
        right.set_attribute_value("after", &Value::Int(1)).unwrap();
        assert_eq!(root_text(&right), "last = true\nafter = 1\n");
    }

    #[test]
    fn block_header_edits() {
        let body = body("resource \"a\" \"b\" { # note\n  x = 1\n}\n");
        let block = body.blocks().next().unwrap();

        block.set_type("data").unwrap();
        block.set_labels(&["c"]).unwrap();
        assert_eq!(root_text(&body), "data \"c\" { # note\n  x = 1\n}\n");
        assert!(block.matches("data", &["c"]));

        block.set_labels(&[]).unwrap();
        assert_eq!(root_text(&body), "data { # note\n  x = 1\n}\n");
    }

    #[test]
    fn rename_attribute() {
        let body = body("old = 1\n");
        body.get_attribute("old").unwrap().set_name("new").unwrap();
        assert_eq!(root_text(&body), "new = 1\n");
        assert!(body.get_attribute("new").is_some());
    }

    #[test]
    fn explicit_style() {
        let body = body("");
        let style = Style::new().line_ending(crate::style::LineEnding::CrLf);
        let block = body.append_new_block_with_style("b", &[], &style).unwrap();
        block
            .body()
            .unwrap()
            .set_attribute_value_with_style("x", &Value::Int(1), &style.clone().indent("\t"))
            .unwrap();
        assert_eq!(root_text(&body), "b {\r\n\tx = 1\r\n}\r\n");
    }

    #[test]
    fn detected_style_is_used() {
        let body = body("a {\r\n\tb = 1\r\n}\r\n");
        let inner = body.blocks().next().unwrap().body().unwrap();
        inner.append_new_block("c", &[]).unwrap();
        assert_eq!(root_text(&body), "a {\r\n\tb = 1\r\n\tc {\r\n\t}\r\n}\r\n");
    }
}
