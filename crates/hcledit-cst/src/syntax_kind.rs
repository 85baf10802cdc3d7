//! Syntax node and token kinds for the HCL CST.

use hcledit_tokenizer::TokenKind;

/// The kind of a syntax element (node or token).
///
/// Tokens are terminal elements, nodes are non-terminal. The distinction is
/// made by value: tokens have lower values than `__LAST_TOKEN`.
///
/// The SCREAMING_CASE naming convention is used to match rowan/rust-analyzer
/// conventions for syntax kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
#[allow(clippy::manual_non_exhaustive)] // __LAST_TOKEN is used for token/node distinction
pub enum SyntaxKind {
    // ========== TOKENS (terminals) ==========
    /// `{`
    O_BRACE = 0,
    /// `}`
    C_BRACE,
    /// `[`
    O_BRACK,
    /// `]`
    C_BRACK,
    /// `(`
    O_PAREN,
    /// `)`
    C_PAREN,
    /// `=`
    EQUAL,
    /// `,`
    COMMA,
    /// `.`
    DOT,
    /// `...`
    ELLIPSIS,
    /// `:`
    COLON,
    /// `?`
    QUESTION,
    /// `=>`
    FAT_ARROW,
    /// `+`
    PLUS,
    /// `-`
    MINUS,
    /// `*`
    STAR,
    /// `/`
    SLASH,
    /// `%`
    PERCENT,
    /// `!`
    BANG,
    /// `&&`
    AND,
    /// `||`
    OR,
    /// `==`
    EQUAL_OP,
    /// `!=`
    NOT_EQUAL,
    /// `<`
    LESS_THAN,
    /// `>`
    GREATER_THAN,
    /// `<=`
    LESS_THAN_EQ,
    /// `>=`
    GREATER_THAN_EQ,
    /// Identifier
    IDENT,
    /// Numeric literal
    NUMBER_LIT,
    /// Opening `"`
    O_QUOTE,
    /// Closing `"`
    C_QUOTE,
    /// Literal text inside a quoted template
    QUOTED_LIT,
    /// `${`
    TEMPLATE_INTERP,
    /// `%{`
    TEMPLATE_CONTROL,
    /// `}` ending a template sequence
    TEMPLATE_SEQ_END,
    /// `<<EOT` plus line ending
    O_HEREDOC,
    /// Heredoc closing delimiter
    C_HEREDOC,
    /// Literal text inside a heredoc
    STRING_LIT,
    /// `#`, `//` or `/* */` comment
    COMMENT,
    /// Spaces and tabs
    WHITESPACE,
    /// `\n` or `\r\n`
    NEWLINE,
    /// End of file
    EOF,
    /// Lexer error
    ERROR,

    // Marker for end of tokens
    #[doc(hidden)]
    __LAST_TOKEN,

    // ========== NODES (non-terminals) ==========
    /// Root node
    FILE,
    /// Ordered attributes, blocks and trivia of a file or block
    BODY,
    /// `type "label" { ... }`
    BLOCK,
    /// `name = expression`
    ATTRIBUTE,
    /// The value side of an attribute
    EXPRESSION,
    /// A single identifier token
    IDENTIFIER,
    /// A single numeric literal token
    NUMBER,
    /// A quoted template, from opening to closing quote
    QUOTED,
    /// A heredoc template, from opener to closing delimiter
    HEREDOC,
    /// A run of comment lines, or a trailing same-line comment
    COMMENTS,
    /// A line holding nothing but optional whitespace
    BLANK_LINE,
    /// Tokens the parser could not structure
    UNPARSED,
}

impl SyntaxKind {
    /// Whether this is a token (terminal) kind.
    pub fn is_token(self) -> bool {
        (self as u16) < (Self::__LAST_TOKEN as u16)
    }

    /// Whether this is a node (non-terminal) kind.
    pub fn is_node(self) -> bool {
        (self as u16) > (Self::__LAST_TOKEN as u16)
    }

    /// Whether this is trivia (whitespace or comments).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE | Self::COMMENT)
    }

    /// Whether this node kind holds tokens only.
    pub fn is_leaf_node(self) -> bool {
        matches!(
            self,
            Self::IDENTIFIER
                | Self::NUMBER
                | Self::QUOTED
                | Self::HEREDOC
                | Self::COMMENTS
                | Self::BLANK_LINE
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::OBrace => Self::O_BRACE,
            TokenKind::CBrace => Self::C_BRACE,
            TokenKind::OBrack => Self::O_BRACK,
            TokenKind::CBrack => Self::C_BRACK,
            TokenKind::OParen => Self::O_PAREN,
            TokenKind::CParen => Self::C_PAREN,
            TokenKind::Equal => Self::EQUAL,
            TokenKind::Comma => Self::COMMA,
            TokenKind::Dot => Self::DOT,
            TokenKind::Ellipsis => Self::ELLIPSIS,
            TokenKind::Colon => Self::COLON,
            TokenKind::Question => Self::QUESTION,
            TokenKind::FatArrow => Self::FAT_ARROW,
            TokenKind::Plus => Self::PLUS,
            TokenKind::Minus => Self::MINUS,
            TokenKind::Star => Self::STAR,
            TokenKind::Slash => Self::SLASH,
            TokenKind::Percent => Self::PERCENT,
            TokenKind::Bang => Self::BANG,
            TokenKind::And => Self::AND,
            TokenKind::Or => Self::OR,
            TokenKind::EqualOp => Self::EQUAL_OP,
            TokenKind::NotEqual => Self::NOT_EQUAL,
            TokenKind::LessThan => Self::LESS_THAN,
            TokenKind::GreaterThan => Self::GREATER_THAN,
            TokenKind::LessThanEq => Self::LESS_THAN_EQ,
            TokenKind::GreaterThanEq => Self::GREATER_THAN_EQ,
            TokenKind::Ident => Self::IDENT,
            TokenKind::Number => Self::NUMBER_LIT,
            TokenKind::OQuote => Self::O_QUOTE,
            TokenKind::CQuote => Self::C_QUOTE,
            TokenKind::QuotedLit => Self::QUOTED_LIT,
            TokenKind::TemplateInterp => Self::TEMPLATE_INTERP,
            TokenKind::TemplateControl => Self::TEMPLATE_CONTROL,
            TokenKind::TemplateSeqEnd => Self::TEMPLATE_SEQ_END,
            TokenKind::OHeredoc => Self::O_HEREDOC,
            TokenKind::CHeredoc => Self::C_HEREDOC,
            TokenKind::StringLit => Self::STRING_LIT,
            TokenKind::Comment => Self::COMMENT,
            TokenKind::Whitespace => Self::WHITESPACE,
            TokenKind::Newline => Self::NEWLINE,
            TokenKind::Eof => Self::EOF,
            TokenKind::Error => Self::ERROR,
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Language definition for HCL, used by rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HclLanguage {}

impl rowan::Language for HclLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        // Raw kinds only ever come from `kind_to_raw`.
        Self::Kind::from_raw(raw.0).unwrap_or(SyntaxKind::ERROR)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

impl SyntaxKind {
    /// Convert from a raw u16 value to SyntaxKind.
    /// Returns None if the value is out of range or corresponds to __LAST_TOKEN.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::O_BRACE),
            1 => Some(Self::C_BRACE),
            2 => Some(Self::O_BRACK),
            3 => Some(Self::C_BRACK),
            4 => Some(Self::O_PAREN),
            5 => Some(Self::C_PAREN),
            6 => Some(Self::EQUAL),
            7 => Some(Self::COMMA),
            8 => Some(Self::DOT),
            9 => Some(Self::ELLIPSIS),
            10 => Some(Self::COLON),
            11 => Some(Self::QUESTION),
            12 => Some(Self::FAT_ARROW),
            13 => Some(Self::PLUS),
            14 => Some(Self::MINUS),
            15 => Some(Self::STAR),
            16 => Some(Self::SLASH),
            17 => Some(Self::PERCENT),
            18 => Some(Self::BANG),
            19 => Some(Self::AND),
            20 => Some(Self::OR),
            21 => Some(Self::EQUAL_OP),
            22 => Some(Self::NOT_EQUAL),
            23 => Some(Self::LESS_THAN),
            24 => Some(Self::GREATER_THAN),
            25 => Some(Self::LESS_THAN_EQ),
            26 => Some(Self::GREATER_THAN_EQ),
            27 => Some(Self::IDENT),
            28 => Some(Self::NUMBER_LIT),
            29 => Some(Self::O_QUOTE),
            30 => Some(Self::C_QUOTE),
            31 => Some(Self::QUOTED_LIT),
            32 => Some(Self::TEMPLATE_INTERP),
            33 => Some(Self::TEMPLATE_CONTROL),
            34 => Some(Self::TEMPLATE_SEQ_END),
            35 => Some(Self::O_HEREDOC),
            36 => Some(Self::C_HEREDOC),
            37 => Some(Self::STRING_LIT),
            38 => Some(Self::COMMENT),
            39 => Some(Self::WHITESPACE),
            40 => Some(Self::NEWLINE),
            41 => Some(Self::EOF),
            42 => Some(Self::ERROR),
            // 43 is __LAST_TOKEN - skip it
            44 => Some(Self::FILE),
            45 => Some(Self::BODY),
            46 => Some(Self::BLOCK),
            47 => Some(Self::ATTRIBUTE),
            48 => Some(Self::EXPRESSION),
            49 => Some(Self::IDENTIFIER),
            50 => Some(Self::NUMBER),
            51 => Some(Self::QUOTED),
            52 => Some(Self::HEREDOC),
            53 => Some(Self::COMMENTS),
            54 => Some(Self::BLANK_LINE),
            55 => Some(Self::UNPARSED),
            _ => None,
        }
    }
}

/// A syntax node in the HCL CST.
pub type SyntaxNode = rowan::SyntaxNode<HclLanguage>;

/// A syntax token in the HCL CST.
pub type SyntaxToken = rowan::SyntaxToken<HclLanguage>;

/// A syntax element (either node or token) in the HCL CST.
pub type SyntaxElement = rowan::SyntaxElement<HclLanguage>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_vs_node() {
        assert!(SyntaxKind::O_BRACE.is_token());
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::ERROR.is_token());

        assert!(SyntaxKind::FILE.is_node());
        assert!(SyntaxKind::BODY.is_node());
        assert!(SyntaxKind::UNPARSED.is_node());
    }

    #[test]
    fn trivia() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::NEWLINE.is_trivia());
        assert!(SyntaxKind::COMMENT.is_trivia());

        assert!(!SyntaxKind::IDENT.is_trivia());
        assert!(!SyntaxKind::COMMENTS.is_trivia());
    }

    #[test]
    fn leaf_nodes() {
        assert!(SyntaxKind::IDENTIFIER.is_leaf_node());
        assert!(SyntaxKind::COMMENTS.is_leaf_node());
        assert!(!SyntaxKind::BODY.is_leaf_node());
        assert!(!SyntaxKind::ATTRIBUTE.is_leaf_node());
    }

    #[test]
    fn token_kind_conversion() {
        assert_eq!(SyntaxKind::from(TokenKind::OBrace), SyntaxKind::O_BRACE);
        assert_eq!(SyntaxKind::from(TokenKind::Number), SyntaxKind::NUMBER_LIT);
        assert_eq!(SyntaxKind::from(TokenKind::Newline), SyntaxKind::NEWLINE);
        assert_eq!(SyntaxKind::from(TokenKind::Error), SyntaxKind::ERROR);
    }

    #[test]
    fn raw_values_roundtrip() {
        for raw in 0..=(SyntaxKind::UNPARSED as u16) {
            match SyntaxKind::from_raw(raw) {
                Some(kind) => assert_eq!(kind as u16, raw),
                None => assert_eq!(raw, SyntaxKind::__LAST_TOKEN as u16),
            }
        }
        assert_eq!(SyntaxKind::from_raw(SyntaxKind::UNPARSED as u16 + 1), None);
    }

    #[test]
    fn rowan_roundtrip() {
        let kind = SyntaxKind::BLOCK;
        let raw = HclLanguage::kind_to_raw(kind);
        let back = HclLanguage::kind_from_raw(raw);
        assert_eq!(kind, back);
    }
}
