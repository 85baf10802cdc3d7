//! Parse errors and their rendering.

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use hcledit_tokenizer::Span;

/// What went wrong while structuring the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A body line starts with something other than a name or comment.
    ExpectedItem,
    /// `name =` with nothing after it on the line.
    ExpectedExpression,
    /// Block header not followed by `{`.
    ExpectedOpenBrace,
    /// Block `{` without a matching `}`.
    UnclosedBlock,
    /// Bracket, quote or template left open.
    UnclosedDelimiter,
    /// Quoted block label without a closing quote.
    UnterminatedLabel,
    /// Tokens after a complete attribute or block on the same line.
    TrailingTokens,
    /// Bytes the tokenizer could not classify.
    InvalidToken,
    /// A single-line block holding anything but a single attribute.
    SingleLineBlock,
}

impl ParseErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedItem => "expected an attribute or block",
            ParseErrorKind::ExpectedExpression => "expected an expression",
            ParseErrorKind::ExpectedOpenBrace => "expected '{' after block header",
            ParseErrorKind::UnclosedBlock => "unclosed block",
            ParseErrorKind::UnclosedDelimiter => "unclosed delimiter",
            ParseErrorKind::UnterminatedLabel => "unterminated block label",
            ParseErrorKind::TrailingTokens => "unexpected tokens after item",
            ParseErrorKind::InvalidToken => "invalid character",
            ParseErrorKind::SingleLineBlock => "invalid single-line block",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedItem => "not an attribute or block",
            ParseErrorKind::ExpectedExpression => "expected a value here",
            ParseErrorKind::ExpectedOpenBrace => "expected '{' here",
            ParseErrorKind::UnclosedBlock => "block ends here",
            ParseErrorKind::UnclosedDelimiter => "opened here",
            ParseErrorKind::UnterminatedLabel => "label starts here",
            ParseErrorKind::TrailingTokens => "expected end of line",
            ParseErrorKind::InvalidToken => "invalid",
            ParseErrorKind::SingleLineBlock => "unexpected content",
        }
    }

    fn help(self) -> Option<&'static str> {
        match self {
            ParseErrorKind::UnclosedBlock => Some("add a closing '}'"),
            ParseErrorKind::TrailingTokens => Some("each attribute and block ends at a newline"),
            ParseErrorKind::SingleLineBlock => {
                Some("a single-line block may hold at most one attribute")
            }
            _ => None,
        }
    }
}

/// A parse error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let range = self.span.start as usize..self.span.end as usize;
        let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(self.kind.message())
            .with_label(
                Label::new((filename, range))
                    .with_message(self.kind.label())
                    .with_color(Color::Red),
            );
        if let Some(help) = self.kind.help() {
            report = report.with_help(help);
        }
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.kind.message(),
            self.span.start,
            self.span.end
        )
    }
}

impl std::error::Error for ParseError {}

/// Every error found in one document, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render every error, one report after another.
    pub fn render(&self, filename: &str, source: &str) -> String {
        self.0
            .iter()
            .map(|error| error.render(filename, source))
            .collect()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no parse errors"),
            [single] => write!(f, "{single}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for ParseErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let error = ParseError::new(ParseErrorKind::UnclosedBlock, Span::new(4, 5));
        assert_eq!(error.to_string(), "unclosed block at 4..5");

        let errors = ParseErrors(vec![error.clone(), error]);
        assert_eq!(errors.to_string(), "unclosed block at 4..5 (and 1 more)");
    }

    #[test]
    fn render_mentions_message_and_file() {
        let source = "a {\n  b = 1\n";
        let error = ParseError::new(ParseErrorKind::UnclosedBlock, Span::new(2, 3));
        let rendered = error.render("main.tf", source);
        assert!(rendered.contains("unclosed block"), "{rendered}");
        assert!(rendered.contains("main.tf"), "{rendered}");
        assert!(rendered.contains("add a closing '}'"), "{rendered}");
    }
}
