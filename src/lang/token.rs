use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    pub fn at(offset: usize) -> Span {
        Span { start: offset, end: offset }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 1-based line and column of `start` in `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let upto = &source[..self.start.min(source.len())];
        let line = upto.matches('\n').count() + 1;
        let col = upto.rfind('\n').map_or(upto.len(), |nl| upto.len() - nl - 1) + 1;
        (line, col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(u64),
    Sample(f32),

    // keywords
    Let,
    In,
    Case,
    Inl,
    Inr,

    // symbols
    Backslash,
    Ampersand,
    Bang,
    ColonColon,
    Colon,
    Comma,
    Dot,
    Equals,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Pipe,
    FatArrow,
    Star,
    Plus,
    Arrow,
    Tilde,

    Eof,
}

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "let" => Some(TokenKind::Let),
            "in" => Some(TokenKind::In),
            "case" => Some(TokenKind::Case),
            "inl" => Some(TokenKind::Inl),
            "inr" => Some(TokenKind::Inr),
            _ => None,
        }
    }

    /// Whether an expression may begin with this token. Juxtaposition keeps
    /// applying arguments while this holds.
    pub fn starts_expr(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Sample(_)
                | TokenKind::LParen
                | TokenKind::Bang
                | TokenKind::Inl
                | TokenKind::Inr
                | TokenKind::Backslash
                | TokenKind::Ampersand
                | TokenKind::Let
                | TokenKind::Case
        )
    }

    /// Short human description used in "expected ..." messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Sample(s) => format!("sample `{s:?}`"),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Let => "let",
            TokenKind::In => "in",
            TokenKind::Case => "case",
            TokenKind::Inl => "inl",
            TokenKind::Inr => "inr",
            TokenKind::Backslash => "\\",
            TokenKind::Ampersand => "&",
            TokenKind::Bang => "!",
            TokenKind::ColonColon => "::",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Equals => "=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Pipe => "|",
            TokenKind::FatArrow => "=>",
            TokenKind::Star => "*",
            TokenKind::Plus => "+",
            TokenKind::Arrow => "->",
            TokenKind::Tilde => "~",
            TokenKind::Ident(_) | TokenKind::Int(_) | TokenKind::Sample(_) | TokenKind::Eof => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "{name}"),
            TokenKind::Int(n) => write!(f, "{n}"),
            TokenKind::Sample(s) => write!(f, "{s:?}"),
            TokenKind::Eof => write!(f, "<eof>"),
            other => write!(f, "{}", other.symbol()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
