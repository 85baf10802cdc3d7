//! Token synthesis for caller-supplied values.
//!
//! Values are rendered the canonical way: strings always quoted, lists on
//! one line, objects one attribute per line. The result is a [`Tokens`]
//! sequence that can be handed to any edit taking raw expression tokens.

use std::fmt;

use crate::style::Style;
use crate::syntax_kind::SyntaxKind;
use crate::tokens::{Token, Tokens};

/// A literal configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Non-finite floats have no literal form and render as `null`.
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// Entries in output order. Duplicate keys are rendered as given.
    Object(Vec<(String, Value)>),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&tokens_for_value(self, &Style::default()), f)
    }
}

/// Tokens for `value` as the expression of a top-level attribute.
pub fn tokens_for_value(value: &Value, style: &Style) -> Tokens {
    tokens_for_value_at(value, style, 0)
}

/// Tokens for `value` as the expression of an attribute nested inside
/// `depth` blocks. Only multi-line objects depend on the depth.
pub fn tokens_for_value_at(value: &Value, style: &Style, depth: usize) -> Tokens {
    let mut writer = ValueWriter {
        out: Tokens::new(),
        style,
    };
    writer.value(value, depth);
    writer.out
}

/// A single identifier token, e.g. for `enabled = true`-style keywords.
pub fn tokens_for_identifier(name: &str) -> Tokens {
    Tokens::from_iter([Token::new(SyntaxKind::IDENT, name)])
}

/// `a.b.c` as identifier and dot tokens.
pub fn tokens_for_traversal(parts: &[&str]) -> Tokens {
    let mut out = Tokens::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(Token::new(SyntaxKind::DOT, "."));
        }
        out.push(Token::new(SyntaxKind::IDENT, *part));
    }
    out
}

struct ValueWriter<'a> {
    out: Tokens,
    style: &'a Style,
}

impl ValueWriter<'_> {
    fn push(&mut self, kind: SyntaxKind, text: impl Into<String>) {
        self.out.push(Token::new(kind, text));
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Null => self.push(SyntaxKind::IDENT, "null"),
            Value::Bool(b) => self.push(SyntaxKind::IDENT, if *b { "true" } else { "false" }),
            Value::Int(n) => {
                if *n < 0 {
                    self.push(SyntaxKind::MINUS, "-");
                }
                self.push(SyntaxKind::NUMBER_LIT, n.unsigned_abs().to_string());
            }
            Value::Float(n) if !n.is_finite() => self.push(SyntaxKind::IDENT, "null"),
            Value::Float(n) => {
                if n.is_sign_negative() && *n != 0.0 {
                    self.push(SyntaxKind::MINUS, "-");
                }
                self.push(SyntaxKind::NUMBER_LIT, n.abs().to_string());
            }
            Value::String(s) => self.string(s),
            Value::List(items) => {
                self.push(SyntaxKind::O_BRACK, "[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(SyntaxKind::COMMA, ",");
                        self.push(SyntaxKind::WHITESPACE, " ");
                    }
                    self.value(item, depth);
                }
                self.push(SyntaxKind::C_BRACK, "]");
            }
            Value::Object(entries) if entries.is_empty() => {
                self.push(SyntaxKind::O_BRACE, "{");
                self.push(SyntaxKind::C_BRACE, "}");
            }
            Value::Object(entries) => {
                let newline = self.style.newline();
                let inner = self.style.indent_for(depth + 1);
                self.push(SyntaxKind::O_BRACE, "{");
                self.push(SyntaxKind::NEWLINE, newline);
                for (key, value) in entries {
                    if !inner.is_empty() {
                        self.push(SyntaxKind::WHITESPACE, inner.clone());
                    }
                    if is_identifier(key) {
                        self.push(SyntaxKind::IDENT, key.clone());
                    } else {
                        self.string(key);
                    }
                    self.push(SyntaxKind::WHITESPACE, " ");
                    self.push(SyntaxKind::EQUAL, "=");
                    self.push(SyntaxKind::WHITESPACE, " ");
                    self.value(value, depth + 1);
                    self.push(SyntaxKind::NEWLINE, newline);
                }
                let outer = self.style.indent_for(depth);
                if !outer.is_empty() {
                    self.push(SyntaxKind::WHITESPACE, outer);
                }
                self.push(SyntaxKind::C_BRACE, "}");
            }
        }
    }

    fn string(&mut self, s: &str) {
        self.push(SyntaxKind::O_QUOTE, "\"");
        if !s.is_empty() {
            self.push(SyntaxKind::QUOTED_LIT, escape_quoted(s));
        }
        self.push(SyntaxKind::C_QUOTE, "\"");
    }
}

/// Whether `name` lexes as a single identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

/// Escape `s` for use between double quotes.
///
/// Template openers are doubled so the result is always a plain literal.
pub(crate) fn escape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Undo [`escape_quoted`] on the literal text of a quoted string.
///
/// Returns `None` on a malformed escape sequence.
pub(crate) fn unescape_quoted(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("$${") {
            out.push_str("${");
            rest = tail;
            continue;
        }
        if let Some(tail) = rest.strip_prefix("%%{") {
            out.push_str("%{");
            rest = tail;
            continue;
        }
        rest = &rest[c.len_utf8()..];
        if c != '\\' {
            out.push(c);
            continue;
        }

        let escaped = rest.chars().next()?;
        rest = &rest[escaped.len_utf8()..];
        match escaped {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' | 'U' => {
                let width = if escaped == 'u' { 4 } else { 8 };
                let hex = rest.get(..width)?;
                let code = u32::from_str_radix(hex, 16).ok()?;
                out.push(char::from_u32(code)?);
                rest = &rest[width..];
            }
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: impl Into<Value>) -> String {
        tokens_for_value(&value.into(), &Style::default()).text()
    }

    #[test]
    fn scalars() {
        assert_eq!(render(Value::Null), "null");
        assert_eq!(render(true), "true");
        assert_eq!(render(42), "42");
        assert_eq!(render(-7), "-7");
        assert_eq!(render(i64::MIN), "-9223372036854775808");
        assert_eq!(render(1.5), "1.5");
        assert_eq!(render(-0.25), "-0.25");
        assert_eq!(render(f64::NAN), "null");
        assert_eq!(render(f64::INFINITY), "null");
    }

    #[test]
    fn negative_numbers_are_two_tokens() {
        let tokens = tokens_for_value(&Value::Int(-3), &Style::default());
        let kinds: Vec<_> = tokens.iter().map(Token::kind).collect();
        assert_eq!(kinds, vec![SyntaxKind::MINUS, SyntaxKind::NUMBER_LIT]);
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(render("plain"), "\"plain\"");
        assert_eq!(render(""), "\"\"");
        assert_eq!(render("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
        assert_eq!(render("${var.x} and %{if}"), "\"$${var.x} and %%{if}\"");
        assert_eq!(render("cost: $5"), "\"cost: $5\"");
        assert_eq!(render("bell\u{7}"), "\"bell\\u0007\"");
    }

    #[test]
    fn lists_are_inline() {
        assert_eq!(render(vec!["a", "b"]), "[\"a\", \"b\"]");
        assert_eq!(render(Vec::<Value>::new()), "[]");
        assert_eq!(
            render(Value::List(vec![Value::Int(1), Value::List(vec![Value::Null])])),
            "[1, [null]]"
        );
    }

    #[test]
    fn objects_are_multiline() {
        let value = Value::Object(vec![
            ("name".into(), "web".into()),
            ("has space".into(), 1.into()),
            (
                "tags".into(),
                Value::Object(vec![("env".into(), "prod".into())]),
            ),
        ]);
        assert_eq!(
            render(value),
            "{\n  name = \"web\"\n  \"has space\" = 1\n  tags = {\n    env = \"prod\"\n  }\n}"
        );
        assert_eq!(render(Value::Object(Vec::new())), "{}");
    }

    #[test]
    fn objects_follow_depth_and_style() {
        let style = Style::new().indent("\t");
        let value = Value::Object(vec![("a".into(), true.into())]);
        let tokens = tokens_for_value_at(&value, &style, 1);
        assert_eq!(tokens.text(), "{\n\t\ta = true\n\t}");
    }

    #[test]
    fn identifiers_and_traversals() {
        assert_eq!(tokens_for_identifier("local").text(), "local");
        assert_eq!(tokens_for_traversal(&["var", "region"]).text(), "var.region");
        assert_eq!(tokens_for_traversal(&[]).len(), 0);
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("aws_instance"));
        assert!(is_identifier("my-name"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn unescape_inverts_escape() {
        for s in ["", "a\"b", "tab\there", "${x}", "100%{", "é\u{1}"] {
            assert_eq!(unescape_quoted(&escape_quoted(s)).as_deref(), Some(s));
        }
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape_quoted("\\u00e9\\U0001F600").as_deref(), Some("é😀"));
        assert_eq!(unescape_quoted("bad\\q"), None);
        assert_eq!(unescape_quoted("trailing\\"), None);
        assert_eq!(unescape_quoted("\\u12"), None);
    }
}
