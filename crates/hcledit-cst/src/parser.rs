//! CST parser for HCL using rowan's GreenNodeBuilder.
//!
//! This parser produces a lossless concrete syntax tree that preserves
//! all whitespace, comments, and exact source representation. Malformed
//! input never fails the parse: bytes the grammar cannot place end up in
//! `UNPARSED` nodes and an error is recorded, so serializing the tree
//! still reproduces the input.
//!
//! Tree shape:
//!
//! ```text
//! FILE
//!   BODY
//!     ATTRIBUTE   COMMENTS? WHITESPACE? IDENTIFIER WHITESPACE? EQUAL
//!                 WHITESPACE? EXPRESSION (WHITESPACE? COMMENTS)? NEWLINE?
//!     BLOCK       COMMENTS? WHITESPACE? IDENTIFIER (IDENTIFIER | QUOTED)*
//!                 O_BRACE NEWLINE BODY WHITESPACE? C_BRACE NEWLINE?
//!     COMMENTS    standalone comment lines
//!     BLANK_LINE  WHITESPACE? NEWLINE
//! ```

use hcledit_tokenizer::{Span, Token, TokenKind, Tokenizer};
use rowan::GreenNode;
use tracing::trace;

use crate::diagnostic::{ParseError, ParseErrorKind, ParseErrors};
use crate::make;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// A parsed HCL document.
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Get a fresh, editable root syntax node.
    ///
    /// Every call returns an independent tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root_mut(self.green.clone())
    }

    /// Get parse errors.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Check if parsing succeeded without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert to Result, returning errors if any.
    pub fn ok(self) -> Result<SyntaxNode, ParseErrors> {
        if self.errors.is_empty() {
            Ok(self.syntax())
        } else {
            Err(ParseErrors(self.errors))
        }
    }

    /// Get the green node (for testing/debugging).
    pub fn green(&self) -> &GreenNode {
        &self.green
    }
}

/// Parse HCL source into a CST.
pub fn parse(source: &str) -> Parse {
    let parser = CstParser::new(source);
    parser.parse()
}

/// CST parser that builds a green tree using rowan.
struct CstParser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    end: u32,
    builder: rowan::GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'src> CstParser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            tokens: Tokenizer::new(source).collect(),
            pos: 0,
            end: source.len() as u32,
            builder: rowan::GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> Parse {
        self.builder.start_node(SyntaxKind::FILE.into());
        self.builder.start_node(SyntaxKind::BODY.into());
        self.parse_body(false);
        self.builder.finish_node();
        self.builder.finish_node();

        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    /// Kind of the token at `index`, `Eof` past the end.
    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Peek at the current token kind.
    fn peek(&self) -> TokenKind {
        self.kind_at(self.pos)
    }

    /// Index of the first non-whitespace token at or after `index`.
    fn skip_whitespace_from(&self, mut index: usize) -> usize {
        while self.kind_at(index) == TokenKind::Whitespace {
            index += 1;
        }
        index
    }

    /// Peek at the first token kind after horizontal whitespace.
    fn peek_past_whitespace(&self) -> TokenKind {
        self.kind_at(self.skip_whitespace_from(self.pos))
    }

    fn span_at(&self, index: usize) -> Span {
        self.tokens
            .get(index)
            .map(|t| t.span)
            .unwrap_or(Span::at(self.end))
    }

    fn current_span(&self) -> Span {
        self.span_at(self.skip_whitespace_from(self.pos))
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        trace!(?kind, ?span, "parse error");
        self.errors.push(ParseError::new(kind, span));
    }

    /// Consume and add the current token to the tree.
    fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            if token.kind == TokenKind::Error {
                self.errors
                    .push(ParseError::new(ParseErrorKind::InvalidToken, token.span));
            }
            self.builder
                .token(SyntaxKind::from(token.kind).into(), token.text);
            self.pos += 1;
        }
    }

    /// Skip horizontal whitespace only.
    fn skip_whitespace(&mut self) {
        while self.peek() == TokenKind::Whitespace {
            self.bump();
        }
    }

    /// Consume tokens up to (not including) the next newline.
    fn bump_to_line_end(&mut self) {
        while !matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
            self.bump();
        }
    }

    fn bump_newline(&mut self) {
        if self.peek() == TokenKind::Newline {
            self.bump();
        }
    }

    /// Whether the current line is `name =`.
    fn at_attribute(&self) -> bool {
        let name = self.skip_whitespace_from(self.pos);
        self.kind_at(name) == TokenKind::Ident
            && self.kind_at(self.skip_whitespace_from(name + 1)) == TokenKind::Equal
    }

    /// Whether the rest of the current line is a single comment.
    fn at_comment_line(&self) -> bool {
        let comment = self.skip_whitespace_from(self.pos);
        self.kind_at(comment) == TokenKind::Comment
            && matches!(
                self.kind_at(self.skip_whitespace_from(comment + 1)),
                TokenKind::Newline | TokenKind::Eof
            )
    }

    /// Parse body items until EOF, or until a `}` when `closing`.
    fn parse_body(&mut self, closing: bool) {
        loop {
            let checkpoint = self.builder.checkpoint();
            match self.peek_past_whitespace() {
                TokenKind::Eof => {
                    if self.peek() == TokenKind::Whitespace {
                        self.builder.start_node(SyntaxKind::BLANK_LINE.into());
                        self.skip_whitespace();
                        self.builder.finish_node();
                    }
                    break;
                }
                TokenKind::Newline => {
                    self.builder.start_node(SyntaxKind::BLANK_LINE.into());
                    self.skip_whitespace();
                    self.bump();
                    self.builder.finish_node();
                }
                // Indentation before the closing brace belongs to the block.
                TokenKind::CBrace if closing => break,
                TokenKind::Comment => {
                    self.parse_comments();
                    if self.peek_past_whitespace() == TokenKind::Ident {
                        self.parse_item(checkpoint);
                    }
                }
                TokenKind::Ident => self.parse_item(checkpoint),
                _ => self.parse_unparsed_line(),
            }
        }
    }

    /// Consecutive full comment lines, or one comment leading code on the
    /// same line.
    fn parse_comments(&mut self) {
        self.builder.start_node(SyntaxKind::COMMENTS.into());
        if self.at_comment_line() {
            while self.at_comment_line() {
                self.skip_whitespace();
                self.bump();
                self.skip_whitespace();
                self.bump_newline();
            }
        } else {
            self.skip_whitespace();
            self.bump();
        }
        self.builder.finish_node();
    }

    fn parse_unparsed_line(&mut self) {
        self.error(ParseErrorKind::ExpectedItem, self.current_span());
        self.builder.start_node(SyntaxKind::UNPARSED.into());
        self.bump_to_line_end();
        self.bump_newline();
        self.builder.finish_node();
    }

    /// An attribute or block, wrapping anything emitted since `checkpoint`
    /// (its lead comments).
    fn parse_item(&mut self, checkpoint: rowan::Checkpoint) {
        if self.at_attribute() {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::ATTRIBUTE.into());
            self.parse_attribute_rest(false);
            self.parse_line_end();
        } else {
            self.builder.start_node_at(checkpoint, SyntaxKind::BLOCK.into());
            self.parse_block_rest();
        }
        self.builder.finish_node();
    }

    fn parse_identifier(&mut self) {
        self.builder.start_node(SyntaxKind::IDENTIFIER.into());
        self.bump();
        self.builder.finish_node();
    }

    /// `name = expression`, without the line end.
    fn parse_attribute_rest(&mut self, inline: bool) {
        self.skip_whitespace();
        self.parse_identifier();
        self.skip_whitespace();
        self.bump(); // =
        self.skip_whitespace();
        self.parse_expression(inline);
    }

    /// Scan one bracketed group opening at `start`.
    ///
    /// Returns the index one past its closer and whether it was closed
    /// cleanly. A quoted template that reaches a newline is unterminated;
    /// the tokenizer resumes expression mode there.
    fn scan_group(&self, start: usize) -> (usize, bool) {
        let mut stack: Vec<TokenKind> = Vec::new();
        let mut clean = true;
        let mut index = start;
        loop {
            let kind = self.kind_at(index);
            match kind {
                TokenKind::Eof => return (index, false),
                TokenKind::Newline if stack.last() == Some(&TokenKind::OQuote) => {
                    stack.pop();
                    clean = false;
                    if stack.is_empty() {
                        return (index, false);
                    }
                }
                kind if kind.is_open_bracket() => stack.push(kind),
                kind if kind.is_close_bracket() => {
                    if let Some(open) = stack.iter().rposition(|&open| kind.closes(open)) {
                        if open + 1 != stack.len() {
                            clean = false;
                        }
                        stack.truncate(open);
                    }
                    if stack.is_empty() {
                        return (index + 1, clean);
                    }
                }
                _ => {}
            }
            index += 1;
        }
    }

    /// Index one past the last token of the expression starting at the
    /// current position.
    fn expression_end(&mut self, inline: bool) -> usize {
        let mut index = self.pos;
        let mut end = index;
        loop {
            match self.kind_at(index) {
                TokenKind::Eof | TokenKind::Newline | TokenKind::Comment => break,
                TokenKind::CBrace if inline => break,
                kind if kind.is_open_bracket() => {
                    let (group_end, clean) = self.scan_group(index);
                    if !clean {
                        let span = self.span_at(index);
                        self.error(ParseErrorKind::UnclosedDelimiter, span);
                    }
                    index = group_end;
                    end = index;
                }
                TokenKind::Whitespace => index += 1,
                _ => {
                    index += 1;
                    end = index;
                }
            }
        }
        end
    }

    fn parse_expression(&mut self, inline: bool) {
        let start = self.pos;
        let end = self.expression_end(inline);
        if start == end {
            self.error(ParseErrorKind::ExpectedExpression, self.span_at(start));
            return;
        }

        let pairs: Vec<(SyntaxKind, &'src str)> = self.tokens[start..end]
            .iter()
            .map(|t| (SyntaxKind::from(t.kind), t.text))
            .collect();
        for token in &self.tokens[start..end] {
            if token.kind == TokenKind::Error {
                self.errors
                    .push(ParseError::new(ParseErrorKind::InvalidToken, token.span));
            }
        }

        self.builder.start_node(SyntaxKind::EXPRESSION.into());
        make::expression_into(&mut self.builder, &pairs);
        self.builder.finish_node();
        self.pos = end;
    }

    /// Optional trailing comment, then the newline ending an item.
    fn parse_line_end(&mut self) {
        match self.peek_past_whitespace() {
            TokenKind::Eof => {
                self.skip_whitespace();
                return;
            }
            // Missing newline before a closing brace; leave the brace to the
            // enclosing block.
            TokenKind::CBrace => {
                self.error(ParseErrorKind::TrailingTokens, self.current_span());
                return;
            }
            _ => {}
        }

        self.skip_whitespace();
        if self.peek() == TokenKind::Comment {
            self.builder.start_node(SyntaxKind::COMMENTS.into());
            self.bump();
            self.builder.finish_node();
            self.skip_whitespace();
        }
        if !matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
            self.error(ParseErrorKind::TrailingTokens, self.current_span());
            self.builder.start_node(SyntaxKind::UNPARSED.into());
            self.bump_to_line_end();
            self.builder.finish_node();
        }
        self.bump_newline();
    }

    fn parse_label(&mut self) {
        let (end, clean) = self.scan_group(self.pos);
        if !clean {
            self.error(ParseErrorKind::UnterminatedLabel, self.span_at(self.pos));
        }
        self.builder.start_node(SyntaxKind::QUOTED.into());
        while self.pos < end {
            self.bump();
        }
        self.builder.finish_node();
    }

    /// `type label* { body }` after any lead comments.
    fn parse_block_rest(&mut self) {
        self.skip_whitespace();
        self.parse_identifier();

        loop {
            match self.peek_past_whitespace() {
                TokenKind::Ident => {
                    self.skip_whitespace();
                    self.parse_identifier();
                }
                TokenKind::OQuote => {
                    self.skip_whitespace();
                    self.parse_label();
                }
                _ => break,
            }
        }

        self.skip_whitespace();
        if self.peek() != TokenKind::OBrace {
            self.error(ParseErrorKind::ExpectedOpenBrace, self.current_span());
            if !matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
                self.builder.start_node(SyntaxKind::UNPARSED.into());
                self.bump_to_line_end();
                self.builder.finish_node();
            }
            self.bump_newline();
            return;
        }
        let open = self.span_at(self.pos);
        self.bump(); // {

        let multiline = matches!(
            self.peek_past_whitespace(),
            TokenKind::Newline | TokenKind::Eof
        ) || self.at_comment_line();

        if multiline {
            self.skip_whitespace();
            if self.peek() == TokenKind::Comment {
                self.builder.start_node(SyntaxKind::COMMENTS.into());
                self.bump();
                self.builder.finish_node();
                self.skip_whitespace();
            }
            self.bump_newline();

            self.builder.start_node(SyntaxKind::BODY.into());
            self.parse_body(true);
            self.builder.finish_node();
        } else {
            self.builder.start_node(SyntaxKind::BODY.into());
            self.parse_inline_body();
            self.builder.finish_node();
        }

        self.skip_whitespace();
        if self.peek() != TokenKind::CBrace {
            self.error(ParseErrorKind::UnclosedBlock, open);
            return;
        }
        self.bump(); // }
        self.parse_line_end();
    }

    /// Content of `{ ... }` on a single line: nothing, or one attribute.
    fn parse_inline_body(&mut self) {
        if self.at_attribute() {
            self.builder.start_node(SyntaxKind::ATTRIBUTE.into());
            self.parse_attribute_rest(true);
            self.builder.finish_node();
        }

        if !matches!(
            self.peek_past_whitespace(),
            TokenKind::CBrace | TokenKind::Newline | TokenKind::Eof
        ) {
            self.error(ParseErrorKind::SingleLineBlock, self.current_span());
            self.builder.start_node(SyntaxKind::UNPARSED.into());
            while !matches!(
                self.peek_past_whitespace(),
                TokenKind::CBrace | TokenKind::Newline | TokenKind::Eof
            ) {
                self.skip_whitespace();
                self.bump();
            }
            self.builder.finish_node();
        }
    }
}
