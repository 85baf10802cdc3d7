//! Tokenizer for HCL native syntax.

use crate::{Span, Token, TokenKind};
use tracing::trace;

/// A tokenizer that produces lossless tokens from HCL source text.
///
/// Templates nest: a quoted string may contain `${ ... }` which may in turn
/// contain another quoted string. The tokenizer keeps a stack of modes so
/// that `}` closes the right construct and string fragments are told apart
/// from expression tokens.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
    /// Template nesting; empty at the top level.
    modes: Vec<Mode>,
}

#[derive(Debug, Clone)]
enum Mode {
    /// Inside `${ ... }` or `%{ ... }`. `depth` counts unmatched `{`.
    Interp { depth: u32 },
    /// Inside `"..."`.
    Quoted,
    /// Inside a heredoc body.
    Heredoc { delimiter: String, line_start: bool },
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
            modes: Vec::new(),
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Advance by n bytes. Callers only pass lengths that end on a char
    /// boundary.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    fn token(&self, kind: TokenKind, start: u32) -> Token<'src> {
        let span = Span::new(start, self.pos);
        let text = &self.source[start as usize..self.pos as usize];
        trace!("Token {:?} at {:?}: {:?}", kind, span, text);
        Token::new(kind, span, text)
    }

    /// Get the next token. Returns [`TokenKind::Eof`] once the input is
    /// exhausted, however deeply nested the current template is.
    pub fn next_token(&mut self) -> Token<'src> {
        if self.is_eof() {
            return self.token(TokenKind::Eof, self.pos);
        }

        match self.modes.last() {
            Some(Mode::Quoted) => self.tokenize_quoted(),
            Some(Mode::Heredoc {
                delimiter,
                line_start,
            }) => {
                let delimiter = delimiter.clone();
                let line_start = *line_start;
                self.tokenize_heredoc(&delimiter, line_start)
            }
            Some(Mode::Interp { .. }) | None => self.tokenize_expression(),
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token<'src> {
        let start = self.pos;
        self.advance();
        self.token(kind, start)
    }

    fn double(&mut self, kind: TokenKind) -> Token<'src> {
        let start = self.pos;
        self.advance_by(2);
        self.token(kind, start)
    }

    fn tokenize_expression(&mut self) -> Token<'src> {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return self.token(TokenKind::Eof, start);
        };

        match c {
            '{' => {
                self.advance();
                if let Some(Mode::Interp { depth }) = self.modes.last_mut() {
                    *depth += 1;
                }
                self.token(TokenKind::OBrace, start)
            }
            '}' => self.tokenize_close_brace(),
            '~' if self.starts_with("~}") && self.at_interp_end() => {
                self.advance_by(2);
                self.modes.pop();
                self.token(TokenKind::TemplateSeqEnd, start)
            }
            '[' => self.single(TokenKind::OBrack),
            ']' => self.single(TokenKind::CBrack),
            '(' => self.single(TokenKind::OParen),
            ')' => self.single(TokenKind::CParen),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '?' => self.single(TokenKind::Question),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '%' => self.single(TokenKind::Percent),

            '"' => {
                self.advance();
                self.modes.push(Mode::Quoted);
                self.token(TokenKind::OQuote, start)
            }

            '#' => self.tokenize_line_comment(1),
            '/' if self.starts_with("//") => self.tokenize_line_comment(2),
            '/' if self.starts_with("/*") => self.tokenize_block_comment(),
            '/' => self.single(TokenKind::Slash),

            '<' if self.scan_heredoc_opener().is_some() => self.tokenize_heredoc_start(),
            '<' if self.starts_with("<=") => self.double(TokenKind::LessThanEq),
            '<' => self.single(TokenKind::LessThan),
            '>' if self.starts_with(">=") => self.double(TokenKind::GreaterThanEq),
            '>' => self.single(TokenKind::GreaterThan),
            '=' if self.starts_with("==") => self.double(TokenKind::EqualOp),
            '=' if self.starts_with("=>") => self.double(TokenKind::FatArrow),
            '=' => self.single(TokenKind::Equal),
            '!' if self.starts_with("!=") => self.double(TokenKind::NotEqual),
            '!' => self.single(TokenKind::Bang),
            '&' if self.starts_with("&&") => self.double(TokenKind::And),
            '|' if self.starts_with("||") => self.double(TokenKind::Or),
            '.' if self.starts_with("...") => {
                self.advance_by(3);
                self.token(TokenKind::Ellipsis, start)
            }
            '.' => self.single(TokenKind::Dot),

            ' ' | '\t' => self.tokenize_whitespace(),
            '\n' => self.single(TokenKind::Newline),
            '\r' if self.peek_nth(1) == Some('\n') => self.double(TokenKind::Newline),

            _ if c.is_ascii_digit() => self.tokenize_number(),
            _ if is_ident_start(c) => self.tokenize_ident(),

            _ => self.single(TokenKind::Error),
        }
    }

    fn at_interp_end(&self) -> bool {
        matches!(self.modes.last(), Some(Mode::Interp { depth: 0 }))
    }

    /// `}` either closes a nested brace or ends the current interpolation.
    fn tokenize_close_brace(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance();
        if self.at_interp_end() {
            self.modes.pop();
            return self.token(TokenKind::TemplateSeqEnd, start);
        }
        if let Some(Mode::Interp { depth }) = self.modes.last_mut() {
            *depth -= 1;
        }
        self.token(TokenKind::CBrace, start)
    }

    fn tokenize_whitespace(&mut self) -> Token<'src> {
        let start = self.pos;
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.advance();
        }
        self.token(TokenKind::Whitespace, start)
    }

    /// `# ...` or `// ...`, up to but not including the line ending.
    fn tokenize_line_comment(&mut self, marker_len: usize) -> Token<'src> {
        let start = self.pos;
        self.advance_by(marker_len);
        while let Some(c) = self.peek() {
            if c == '\n' || (c == '\r' && self.peek_nth(1) == Some('\n')) {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Comment, start)
    }

    fn tokenize_block_comment(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance_by(2);
        match self.remaining.find("*/") {
            Some(end) => {
                self.advance_by(end + 2);
                self.token(TokenKind::Comment, start)
            }
            None => {
                // Unterminated: swallow the rest of the input.
                self.advance_by(self.remaining.len());
                self.token(TokenKind::Error, start)
            }
        }
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn tokenize_number(&mut self) -> Token<'src> {
        let start = self.pos;
        self.eat_digits();
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let digits_at = if matches!(self.peek_nth(1), Some('+' | '-')) {
                2
            } else {
                1
            };
            if self.peek_nth(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                self.advance_by(digits_at);
                self.eat_digits();
            }
        }
        self.token(TokenKind::Number, start)
    }

    fn tokenize_ident(&mut self) -> Token<'src> {
        let start = self.pos;
        self.advance();
        while self.peek().is_some_and(is_ident_char) {
            self.advance();
        }
        self.token(TokenKind::Ident, start)
    }

    /// Recognize `<<EOT\n` or `<<-EOT\n` at the current position.
    ///
    /// Returns the opener length in bytes (including the line ending) and
    /// the delimiter. A `<<` not followed by an identifier and a line ending
    /// is not a heredoc.
    fn scan_heredoc_opener(&self) -> Option<(usize, &'src str)> {
        let rest = self.remaining.strip_prefix("<<")?;
        let (rest, dash) = match rest.strip_prefix('-') {
            Some(rest) => (rest, 1),
            None => (rest, 0),
        };
        if !rest.chars().next().is_some_and(is_ident_start) {
            return None;
        }
        let end = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        let after = &rest[end..];
        let newline = if after.starts_with("\r\n") {
            2
        } else if after.starts_with('\n') {
            1
        } else {
            return None;
        };
        Some((2 + dash + end + newline, &rest[..end]))
    }

    fn tokenize_heredoc_start(&mut self) -> Token<'src> {
        let start = self.pos;
        let Some((len, delimiter)) = self.scan_heredoc_opener() else {
            return self.single(TokenKind::Error);
        };
        self.advance_by(len);
        self.modes.push(Mode::Heredoc {
            delimiter: delimiter.to_string(),
            line_start: true,
        });
        self.token(TokenKind::OHeredoc, start)
    }

    /// Length of the closing delimiter line (indentation plus delimiter) if
    /// the current line closes the heredoc.
    fn heredoc_closer_len(&self, delimiter: &str) -> Option<usize> {
        let trimmed = self.remaining.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let indent = self.remaining.len() - trimmed.len();
        let after = trimmed.strip_prefix(delimiter)?;
        if after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n") {
            Some(indent + delimiter.len())
        } else {
            None
        }
    }

    fn set_heredoc_line_start(&mut self, value: bool) {
        if let Some(Mode::Heredoc { line_start, .. }) = self.modes.last_mut() {
            *line_start = value;
        }
    }

    fn at_template_open(&self) -> bool {
        self.starts_with("${") || self.starts_with("%{")
    }

    fn at_escaped_template_open(&self) -> bool {
        self.starts_with("$${") || self.starts_with("%%{")
    }

    fn tokenize_template_open(&mut self) -> Token<'src> {
        let start = self.pos;
        let kind = if self.starts_with("${") {
            TokenKind::TemplateInterp
        } else {
            TokenKind::TemplateControl
        };
        self.advance_by(2);
        if self.peek() == Some('~') {
            self.advance();
        }
        self.modes.push(Mode::Interp { depth: 0 });
        self.token(kind, start)
    }

    fn tokenize_heredoc(&mut self, delimiter: &str, line_start: bool) -> Token<'src> {
        let start = self.pos;

        if line_start && let Some(len) = self.heredoc_closer_len(delimiter) {
            self.advance_by(len);
            self.modes.pop();
            return self.token(TokenKind::CHeredoc, start);
        }

        if self.at_template_open() {
            self.set_heredoc_line_start(false);
            return self.tokenize_template_open();
        }

        let mut ends_line = false;
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.advance();
                    ends_line = true;
                    break;
                }
                '$' | '%' if self.at_escaped_template_open() => self.advance_by(3),
                '$' | '%' if self.peek_nth(1) == Some('{') => break,
                _ => {
                    self.advance();
                }
            }
        }
        self.set_heredoc_line_start(ends_line);
        self.token(TokenKind::StringLit, start)
    }

    fn tokenize_quoted(&mut self) -> Token<'src> {
        let start = self.pos;

        match self.peek() {
            Some('"') => {
                self.advance();
                self.modes.pop();
                return self.token(TokenKind::CQuote, start);
            }
            // Quoted strings cannot span lines; leave the template and let
            // the parser report the missing quote.
            Some('\n') => {
                self.modes.pop();
                return self.tokenize_expression();
            }
            Some('\r') if self.peek_nth(1) == Some('\n') => {
                self.modes.pop();
                return self.tokenize_expression();
            }
            _ if self.at_template_open() => return self.tokenize_template_open(),
            _ => {}
        }

        while let Some(c) = self.peek() {
            match c {
                '"' | '\n' => break,
                '\r' if self.peek_nth(1) == Some('\n') => break,
                '\\' => {
                    self.advance();
                    match self.peek() {
                        None | Some('\n') => {}
                        Some('\r') if self.peek_nth(1) == Some('\n') => {}
                        Some(_) => {
                            self.advance();
                        }
                    }
                }
                '$' | '%' if self.at_escaped_template_open() => self.advance_by(3),
                '$' | '%' if self.peek_nth(1) == Some('{') => break,
                _ => {
                    self.advance();
                }
            }
        }

        self.token(TokenKind::QuotedLit, start)
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Check if a character can start an identifier.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
