//! Token types for HCL native syntax.

use crate::Span;

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Brackets
    /// `{`
    OBrace,
    /// `}`
    CBrace,
    /// `[`
    OBrack,
    /// `]`
    CBrack,
    /// `(`
    OParen,
    /// `)`
    CParen,

    // Punctuation
    /// `=`
    Equal,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `...`
    Ellipsis,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `=>`
    FatArrow,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `==`
    EqualOp,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanEq,
    /// `>=`
    GreaterThanEq,

    // Literals
    /// Identifier: `resource`, `var`, `for_each`, `my-name`
    Ident,
    /// Numeric literal: `42`, `1.5`, `1e10`
    Number,

    // Templates
    /// Opening `"` of a quoted template
    OQuote,
    /// Closing `"` of a quoted template
    CQuote,
    /// Literal text inside a quoted template, escapes left as written
    QuotedLit,
    /// `${` or `${~`
    TemplateInterp,
    /// `%{` or `%{~`
    TemplateControl,
    /// `}` or `~}` closing an interpolation or directive
    TemplateSeqEnd,
    /// Heredoc opener including its newline: `<<EOT\n`, `<<-EOT\n`
    OHeredoc,
    /// Heredoc closer: the delimiter line without its newline
    CHeredoc,
    /// Literal text inside a heredoc template
    StringLit,

    // Trivia
    /// `# ...`, `// ...` or `/* ... */`
    Comment,
    /// Horizontal whitespace: spaces and tabs
    Whitespace,
    /// `\n` or `\r\n`
    Newline,

    /// End of input
    Eof,
    /// Unrecognized or malformed input
    Error,
}

impl TokenKind {
    /// Whether this token is trivia (whitespace, newlines or comments).
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }

    /// Whether this token opens a bracketed region an expression can span
    /// lines inside of.
    pub fn is_open_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::OBrace
                | TokenKind::OBrack
                | TokenKind::OParen
                | TokenKind::TemplateInterp
                | TokenKind::TemplateControl
                | TokenKind::OQuote
                | TokenKind::OHeredoc
        )
    }

    /// Whether this token closes a region opened by an
    /// [`is_open_bracket`](Self::is_open_bracket) token.
    pub fn is_close_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::CBrace
                | TokenKind::CBrack
                | TokenKind::CParen
                | TokenKind::TemplateSeqEnd
                | TokenKind::CQuote
                | TokenKind::CHeredoc
        )
    }

    /// Whether this token closes a region opened by `open`.
    pub fn closes(&self, open: TokenKind) -> bool {
        matches!(
            (open, *self),
            (TokenKind::OBrace, TokenKind::CBrace)
                | (TokenKind::OBrack, TokenKind::CBrack)
                | (TokenKind::OParen, TokenKind::CParen)
                | (TokenKind::TemplateInterp, TokenKind::TemplateSeqEnd)
                | (TokenKind::TemplateControl, TokenKind::TemplateSeqEnd)
                | (TokenKind::OQuote, TokenKind::CQuote)
                | (TokenKind::OHeredoc, TokenKind::CHeredoc)
        )
    }
}

/// A token with its kind, span, and source text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'src str,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Self { kind, span, text }
    }
}
