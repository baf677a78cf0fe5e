use std::fmt;

use super::token::Span;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct ParseError {
    pub span: Span,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("invalid token `{text}`")]
    InvalidToken { text: String },

    #[error("expected {expected}, found {found}")]
    Unexpected { expected: Expected, found: String },

    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: Expected },

    #[error("integer literal `{text}` does not fit in 64 bits")]
    IntegerOutOfRange { text: String },

    #[error("sample literal `{text}` is out of range")]
    SampleOutOfRange { text: String },

    #[error("expression nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// What the parser was looking for, e.g. `` `=>` `` or "an expression".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expected(pub Vec<String>);

impl Expected {
    pub fn one(what: impl Into<String>) -> Expected {
        Expected(vec![what.into()])
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "nothing"),
            [only] => write!(f, "{only}"),
            [init @ .., last] => write!(f, "{} or {}", init.join(", "), last),
        }
    }
}

impl ParseError {
    pub fn new(span: Span, kind: ParseErrorKind) -> ParseError {
        ParseError { span, kind }
    }

    /// The expected-token description, if this is an "expected ..." error.
    pub fn expected(&self) -> Option<&Expected> {
        match &self.kind {
            ParseErrorKind::Unexpected { expected, .. }
            | ParseErrorKind::UnexpectedEof { expected } => Some(expected),
            _ => None,
        }
    }

    /// Renders the error with the offending line and a caret underline.
    pub fn render(&self, source: &str) -> String {
        let (line, col) = self.span.line_col(source);
        let text = source.lines().nth(line - 1).unwrap_or("");
        let width = self.span.len().max(1);
        format!(
            "error: {}\n --> {}:{}\n  | {}\n  | {}{}",
            self.kind,
            line,
            col,
            text,
            " ".repeat(col - 1),
            "^".repeat(width)
        )
    }
}
